//! Courses, their modules and lessons

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::info;

use super::{load_course, load_lesson, load_owned_course, new_id, required};
use crate::domain::course::{slugify, unique_slug, CourseLevel, CourseStatus};
use crate::domain::course_import::ExternalCourse;
use crate::domain::monetization::MonetizationType;
use crate::domain::Actor;
use crate::infrastructure::cache::{CacheService, CacheTtl};
use crate::infrastructure::database::entities::{course, course_module, enrollment, lesson};
use crate::shared::best_effort;
use crate::shared::errors::{DomainError, DomainResult};
use crate::shared::pagination::{PaginatedResult, PaginationParams};

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub level: CourseLevel,
    pub language: String,
    pub price_cents: i64,
    pub currency: String,
    pub monetization_type: MonetizationType,
    pub capacity: Option<i32>,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CourseChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub level: Option<CourseLevel>,
    pub language: Option<String>,
    pub price_cents: Option<i64>,
    pub capacity: Option<Option<i32>>,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CourseFilter {
    pub status: Option<CourseStatus>,
    pub category: Option<String>,
    pub level: Option<CourseLevel>,
    pub teacher_id: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewLesson {
    pub title: String,
    pub content: Option<String>,
    pub video_uid: Option<String>,
    pub video_url: Option<String>,
    pub duration_seconds: i32,
    pub is_preview: bool,
    pub price_cents: i64,
}

#[derive(Debug, Clone, Default)]
pub struct LessonChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub video_uid: Option<String>,
    pub video_url: Option<String>,
    pub duration_seconds: Option<i32>,
    pub is_preview: Option<bool>,
    pub price_cents: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleWithLessons {
    #[serde(flatten)]
    pub module: course_module::Model,
    pub lessons: Vec<lesson::Model>,
}

pub(crate) fn course_cache_key(course_id: &str) -> String {
    format!("course:{}", course_id)
}

pub struct CourseService {
    db: DatabaseConnection,
    cache: Arc<CacheService>,
}

impl CourseService {
    pub fn new(db: DatabaseConnection, cache: Arc<CacheService>) -> Self {
        Self { db, cache }
    }

    pub async fn create_course(&self, actor: &Actor, input: NewCourse) -> DomainResult<course::Model> {
        actor.ensure_teacher()?;
        let created = insert_course(&self.db, &actor.user_id, input, None).await?;
        info!(course_id = %created.id, teacher_id = %actor.user_id, slug = %created.slug, "Course created");
        Ok(created)
    }

    pub async fn get(&self, course_id: &str) -> DomainResult<course::Model> {
        let key = course_cache_key(course_id);
        if let Some(hit) = self.cache.get::<course::Model>(&key) {
            return Ok(hit);
        }
        let found = load_course(&self.db, course_id).await?;
        best_effort("cache_course", async { self.cache.set(&key, &found, CacheTtl::Medium) }).await;
        Ok(found)
    }

    pub async fn get_by_slug(&self, slug: &str) -> DomainResult<course::Model> {
        course::Entity::find()
            .filter(course::Column::Slug.eq(slug))
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "Course",
                field: "slug",
                value: slug.to_string(),
            })
    }

    pub async fn list(
        &self,
        filter: CourseFilter,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<course::Model>> {
        let mut query = course::Entity::find().order_by_desc(course::Column::CreatedAt);
        if let Some(status) = filter.status {
            query = query.filter(course::Column::Status.eq(status));
        }
        if let Some(category) = filter.category {
            query = query.filter(course::Column::Category.eq(category));
        }
        if let Some(level) = filter.level {
            query = query.filter(course::Column::Level.eq(level));
        }
        if let Some(teacher_id) = filter.teacher_id {
            query = query.filter(course::Column::TeacherId.eq(teacher_id));
        }
        if let Some(search) = filter.search.filter(|s| !s.trim().is_empty()) {
            query = query.filter(course::Column::Title.contains(search.trim()));
        }

        let paginator = query.paginate(&self.db, page.limit as u64);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page((page.page - 1) as u64).await?;
        Ok(PaginatedResult::new(items, total, page.page, page.limit))
    }

    pub async fn update(&self, actor: &Actor, course_id: &str, changes: CourseChanges) -> DomainResult<course::Model> {
        let existing = load_owned_course(&self.db, actor, course_id).await?;
        let mut active: course::ActiveModel = existing.into();
        if let Some(title) = changes.title {
            active.title = Set(required("title", &title)?);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        if let Some(category) = changes.category {
            active.category = Set(Some(category));
        }
        if let Some(level) = changes.level {
            active.level = Set(level);
        }
        if let Some(language) = changes.language {
            active.language = Set(language);
        }
        if let Some(price) = changes.price_cents {
            if price < 0 {
                return Err(DomainError::validation("Price cannot be negative"));
            }
            active.price_cents = Set(price);
        }
        if let Some(capacity) = changes.capacity {
            validate_capacity(capacity)?;
            active.capacity = Set(capacity);
        }
        if let Some(url) = changes.thumbnail_url {
            active.thumbnail_url = Set(Some(url));
        }
        active.updated_at = Set(Utc::now());
        let updated = active.update(&self.db).await?;
        self.cache.delete(&course_cache_key(course_id));
        Ok(updated)
    }

    /// A course needs at least one lesson before it can be published.
    pub async fn publish(&self, actor: &Actor, course_id: &str) -> DomainResult<course::Model> {
        let existing = load_owned_course(&self.db, actor, course_id).await?;
        if existing.status == CourseStatus::Published {
            return Ok(existing);
        }
        let lessons = lesson::Entity::find()
            .filter(lesson::Column::CourseId.eq(course_id))
            .count(&self.db)
            .await?;
        if lessons == 0 {
            return Err(DomainError::validation("A course needs at least one lesson to be published"));
        }
        let now = Utc::now();
        let mut active: course::ActiveModel = existing.into();
        active.status = Set(CourseStatus::Published);
        active.published_at = Set(Some(now));
        active.updated_at = Set(now);
        let updated = active.update(&self.db).await?;
        self.cache.delete(&course_cache_key(course_id));
        info!(course_id, "Course published");
        Ok(updated)
    }

    pub async fn archive(&self, actor: &Actor, course_id: &str) -> DomainResult<course::Model> {
        let existing = load_owned_course(&self.db, actor, course_id).await?;
        let mut active: course::ActiveModel = existing.into();
        active.status = Set(CourseStatus::Archived);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&self.db).await?;
        self.cache.delete(&course_cache_key(course_id));
        Ok(updated)
    }

    /// Only courses nobody ever enrolled in can be deleted.
    pub async fn delete(&self, actor: &Actor, course_id: &str) -> DomainResult<()> {
        load_owned_course(&self.db, actor, course_id).await?;
        let enrollments = enrollment::Entity::find()
            .filter(enrollment::Column::CourseId.eq(course_id))
            .count(&self.db)
            .await?;
        if enrollments > 0 {
            return Err(DomainError::Conflict("Course has enrollments and cannot be deleted".into()));
        }
        course::Entity::delete_by_id(course_id.to_string()).exec(&self.db).await?;
        self.cache.delete(&course_cache_key(course_id));
        info!(course_id, "Course deleted");
        Ok(())
    }

    pub async fn add_module(&self, actor: &Actor, course_id: &str, title: &str) -> DomainResult<course_module::Model> {
        load_owned_course(&self.db, actor, course_id).await?;
        insert_module(&self.db, course_id, &required("title", title)?).await
    }

    pub async fn list_modules(&self, course_id: &str) -> DomainResult<Vec<ModuleWithLessons>> {
        load_course(&self.db, course_id).await?;
        let modules = course_module::Entity::find()
            .filter(course_module::Column::CourseId.eq(course_id))
            .order_by_asc(course_module::Column::Position)
            .all(&self.db)
            .await?;
        let mut lessons = lesson::Entity::find()
            .filter(lesson::Column::CourseId.eq(course_id))
            .order_by_asc(lesson::Column::Position)
            .all(&self.db)
            .await?;

        Ok(modules
            .into_iter()
            .map(|module| {
                let (mine, rest): (Vec<_>, Vec<_>) =
                    lessons.drain(..).partition(|l| l.module_id == module.id);
                lessons = rest;
                ModuleWithLessons { module, lessons: mine }
            })
            .collect())
    }

    pub async fn add_lesson(&self, actor: &Actor, module_id: &str, input: NewLesson) -> DomainResult<lesson::Model> {
        let module = load_module(&self.db, module_id).await?;
        load_owned_course(&self.db, actor, &module.course_id).await?;
        let created = insert_lesson(&self.db, &module, input).await?;
        info!(lesson_id = %created.id, course_id = %module.course_id, "Lesson added");
        Ok(created)
    }

    pub async fn update_lesson(&self, actor: &Actor, lesson_id: &str, changes: LessonChanges) -> DomainResult<lesson::Model> {
        let existing = load_lesson(&self.db, lesson_id).await?;
        load_owned_course(&self.db, actor, &existing.course_id).await?;
        let mut active: lesson::ActiveModel = existing.into();
        if let Some(title) = changes.title {
            active.title = Set(required("title", &title)?);
        }
        if let Some(content) = changes.content {
            active.content = Set(Some(content));
        }
        if let Some(uid) = changes.video_uid {
            active.video_uid = Set(Some(uid));
        }
        if let Some(url) = changes.video_url {
            active.video_url = Set(Some(url));
        }
        if let Some(d) = changes.duration_seconds {
            active.duration_seconds = Set(d.max(0));
        }
        if let Some(p) = changes.is_preview {
            active.is_preview = Set(p);
        }
        if let Some(price) = changes.price_cents {
            if price < 0 {
                return Err(DomainError::validation("Price cannot be negative"));
            }
            active.price_cents = Set(price);
        }
        active.updated_at = Set(Utc::now());
        Ok(active.update(&self.db).await?)
    }

    pub async fn delete_lesson(&self, actor: &Actor, lesson_id: &str) -> DomainResult<()> {
        let existing = load_lesson(&self.db, lesson_id).await?;
        load_owned_course(&self.db, actor, &existing.course_id).await?;
        lesson::Entity::delete_by_id(lesson_id.to_string()).exec(&self.db).await?;
        Ok(())
    }

    /// `ordered_ids` must list every lesson of the module exactly once.
    pub async fn reorder_lessons(
        &self,
        actor: &Actor,
        module_id: &str,
        ordered_ids: &[String],
    ) -> DomainResult<Vec<lesson::Model>> {
        let module = load_module(&self.db, module_id).await?;
        load_owned_course(&self.db, actor, &module.course_id).await?;

        let txn = self.db.begin().await?;
        let current = lesson::Entity::find()
            .filter(lesson::Column::ModuleId.eq(module_id))
            .all(&txn)
            .await?;
        let mut expected: Vec<&str> = current.iter().map(|l| l.id.as_str()).collect();
        let mut given: Vec<&str> = ordered_ids.iter().map(String::as_str).collect();
        expected.sort_unstable();
        given.sort_unstable();
        if expected != given {
            return Err(DomainError::validation("Reorder must list every lesson of the module exactly once"));
        }

        let now = Utc::now();
        for lesson_model in current {
            let position = ordered_ids
                .iter()
                .position(|id| *id == lesson_model.id)
                .unwrap_or_default() as i32
                + 1;
            let mut active: lesson::ActiveModel = lesson_model.into();
            active.position = Set(position);
            active.updated_at = Set(now);
            active.update(&txn).await?;
        }
        txn.commit().await?;

        Ok(lesson::Entity::find()
            .filter(lesson::Column::ModuleId.eq(module_id))
            .order_by_asc(lesson::Column::Position)
            .all(&self.db)
            .await?)
    }
}

/// Insert a draft course with a single module holding every imported lesson.
/// Runs on the caller's transaction so the import job can commit it together
/// with its COMPLETED transition.
pub(crate) async fn insert_external_course<C: ConnectionTrait>(
    db: &C,
    teacher_id: &str,
    external: &ExternalCourse,
) -> DomainResult<(course::Model, usize)> {
    let created = insert_course(
        db,
        teacher_id,
        NewCourse {
            title: external.title.clone(),
            description: external.description.clone(),
            category: external.category.clone(),
            level: CourseLevel::Beginner,
            language: "en".into(),
            price_cents: 0,
            currency: "USD".into(),
            monetization_type: MonetizationType::Free,
            capacity: None,
            thumbnail_url: external.thumbnail_url.clone(),
        },
        Some(external),
    )
    .await?;
    let module = insert_module(db, &created.id, "Imported content").await?;
    for item in &external.lessons {
        insert_lesson(
            db,
            &module,
            NewLesson {
                title: item.title.clone(),
                content: item.content.clone(),
                video_uid: None,
                video_url: item.video_url.clone(),
                duration_seconds: item.duration_seconds.max(0),
                is_preview: false,
                price_cents: 0,
            },
        )
        .await?;
    }
    Ok((created, external.lessons.len()))
}

fn validate_capacity(capacity: Option<i32>) -> DomainResult<()> {
    if matches!(capacity, Some(c) if c < 1) {
        return Err(DomainError::validation("Capacity must be at least 1"));
    }
    Ok(())
}

async fn insert_course<C: ConnectionTrait>(
    db: &C,
    teacher_id: &str,
    input: NewCourse,
    source: Option<&ExternalCourse>,
) -> DomainResult<course::Model> {
    let title = required("title", &input.title)?;
    if input.price_cents < 0 {
        return Err(DomainError::validation("Price cannot be negative"));
    }
    validate_capacity(input.capacity)?;

    let base = slugify(&title);
    let taken: Vec<String> = course::Entity::find()
        .filter(course::Column::Slug.starts_with(base.as_str()))
        .all(db)
        .await?
        .into_iter()
        .map(|c| c.slug)
        .collect();
    let slug = unique_slug(&base, &taken);

    let now = Utc::now();
    Ok(course::ActiveModel {
        id: Set(new_id()),
        title: Set(title),
        slug: Set(slug),
        description: Set(input.description),
        teacher_id: Set(teacher_id.to_string()),
        category: Set(input.category),
        level: Set(input.level),
        language: Set(input.language),
        price_cents: Set(input.price_cents),
        currency: Set(input.currency.to_uppercase()),
        monetization_type: Set(input.monetization_type),
        status: Set(CourseStatus::Draft),
        capacity: Set(input.capacity),
        thumbnail_url: Set(input.thumbnail_url),
        source_provider: Set(source.map(|s| s.provider.as_str().to_string())),
        external_id: Set(source.map(|s| s.external_id.clone())),
        published_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?)
}

async fn load_module<C: ConnectionTrait>(db: &C, module_id: &str) -> DomainResult<course_module::Model> {
    course_module::Entity::find_by_id(module_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Module", module_id))
}

async fn insert_module<C: ConnectionTrait>(db: &C, course_id: &str, title: &str) -> DomainResult<course_module::Model> {
    let position = course_module::Entity::find()
        .filter(course_module::Column::CourseId.eq(course_id))
        .count(db)
        .await? as i32
        + 1;
    Ok(course_module::ActiveModel {
        id: Set(new_id()),
        course_id: Set(course_id.to_string()),
        title: Set(title.to_string()),
        position: Set(position),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await?)
}

/// Appends after the module's last lesson.
async fn insert_lesson<C: ConnectionTrait>(
    db: &C,
    module: &course_module::Model,
    input: NewLesson,
) -> DomainResult<lesson::Model> {
    let title = required("title", &input.title)?;
    if input.price_cents < 0 {
        return Err(DomainError::validation("Price cannot be negative"));
    }
    let last = lesson::Entity::find()
        .filter(lesson::Column::ModuleId.eq(module.id.as_str()))
        .order_by_desc(lesson::Column::Position)
        .one(db)
        .await?;
    let position = last.map(|l| l.position).unwrap_or(0) + 1;

    let now = Utc::now();
    Ok(lesson::ActiveModel {
        id: Set(new_id()),
        module_id: Set(module.id.clone()),
        course_id: Set(module.course_id.clone()),
        title: Set(title),
        content: Set(input.content),
        video_uid: Set(input.video_uid),
        video_url: Set(input.video_url),
        duration_seconds: Set(input.duration_seconds.max(0)),
        position: Set(position),
        is_preview: Set(input.is_preview),
        price_cents: Set(input.price_cents),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?)
}
