//! Course reviews and rating summaries

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::info;

use super::{ensure_enrolled, load_course, new_id};
use crate::domain::review::{validate_rating, RatingSummary};
use crate::domain::Actor;
use crate::infrastructure::cache::{CacheService, CacheTtl};
use crate::infrastructure::database::entities::review;
use crate::shared::best_effort;
use crate::shared::errors::{DomainError, DomainResult};
use crate::shared::pagination::{PaginatedResult, PaginationParams};

fn summary_key(course_id: &str) -> String {
    format!("reviews:summary:{}", course_id)
}

pub struct ReviewService {
    db: DatabaseConnection,
    cache: Arc<CacheService>,
}

impl ReviewService {
    pub fn new(db: DatabaseConnection, cache: Arc<CacheService>) -> Self {
        Self { db, cache }
    }

    /// One review per student and course.
    pub async fn create(&self, actor: &Actor, course_id: &str, rating: i32, comment: Option<String>) -> DomainResult<review::Model> {
        let rating = validate_rating(rating)?;
        ensure_enrolled(&self.db, &actor.user_id, course_id).await?;
        let existing = review::Entity::find()
            .filter(review::Column::CourseId.eq(course_id))
            .filter(review::Column::StudentId.eq(&actor.user_id))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(DomainError::Conflict("You have already reviewed this course".into()));
        }
        let now = Utc::now();
        let created = review::ActiveModel {
            id: Set(new_id()),
            course_id: Set(course_id.to_string()),
            student_id: Set(actor.user_id.clone()),
            rating: Set(rating),
            comment: Set(comment),
            teacher_reply: Set(None),
            replied_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;
        self.invalidate(course_id);
        info!(review_id = %created.id, course_id, rating, "Review created");
        Ok(created)
    }

    pub async fn update(&self, actor: &Actor, review_id: &str, rating: Option<i32>, comment: Option<String>) -> DomainResult<review::Model> {
        let found = self.load(review_id).await?;
        if found.student_id != actor.user_id {
            return Err(DomainError::forbidden("You can only edit your own review"));
        }
        let course_id = found.course_id.clone();
        let mut active: review::ActiveModel = found.into();
        if let Some(rating) = rating {
            active.rating = Set(validate_rating(rating)?);
        }
        if comment.is_some() {
            active.comment = Set(comment);
        }
        active.updated_at = Set(Utc::now());
        let updated = active.update(&self.db).await?;
        self.invalidate(&course_id);
        Ok(updated)
    }

    /// Author or admin.
    pub async fn delete(&self, actor: &Actor, review_id: &str) -> DomainResult<()> {
        let found = self.load(review_id).await?;
        actor.ensure_owns(&found.student_id, "review")?;
        review::Entity::delete_by_id(review_id.to_string()).exec(&self.db).await?;
        self.invalidate(&found.course_id);
        Ok(())
    }

    pub async fn reply(&self, actor: &Actor, review_id: &str, reply: &str) -> DomainResult<review::Model> {
        let found = self.load(review_id).await?;
        let course = load_course(&self.db, &found.course_id).await?;
        actor.ensure_owns(&course.teacher_id, "course")?;
        let reply = reply.trim();
        if reply.is_empty() {
            return Err(DomainError::validation("reply must not be empty"));
        }
        let now = Utc::now();
        let mut active: review::ActiveModel = found.into();
        active.teacher_reply = Set(Some(reply.to_string()));
        active.replied_at = Set(Some(now));
        active.updated_at = Set(now);
        Ok(active.update(&self.db).await?)
    }

    pub async fn list_for_course(&self, course_id: &str, page: PaginationParams) -> DomainResult<PaginatedResult<review::Model>> {
        let paginator = review::Entity::find()
            .filter(review::Column::CourseId.eq(course_id))
            .order_by_desc(review::Column::CreatedAt)
            .paginate(&self.db, page.limit as u64);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page((page.page - 1) as u64).await?;
        Ok(PaginatedResult::new(items, total, page.page, page.limit))
    }

    pub async fn summary(&self, course_id: &str) -> DomainResult<RatingSummary> {
        let key = summary_key(course_id);
        if let Some(hit) = self.cache.get::<RatingSummary>(&key) {
            return Ok(hit);
        }
        let ratings: Vec<i32> = review::Entity::find()
            .select_only()
            .column(review::Column::Rating)
            .filter(review::Column::CourseId.eq(course_id))
            .into_tuple()
            .all(&self.db)
            .await?;
        let summary = RatingSummary::from_ratings(&ratings);
        best_effort("cache_rating_summary", async { self.cache.set(&key, &summary, CacheTtl::Medium) }).await;
        Ok(summary)
    }

    fn invalidate(&self, course_id: &str) {
        self.cache.delete(&summary_key(course_id));
        self.cache.delete(&format!("course:{}", course_id));
    }

    async fn load(&self, review_id: &str) -> DomainResult<review::Model> {
        review::Entity::find_by_id(review_id.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Review", review_id))
    }
}

/// Average rating per course for a set of course ids, used by listings and comparisons.
pub(crate) async fn rating_summaries<C: sea_orm::ConnectionTrait>(
    db: &C,
    course_ids: &[String],
) -> DomainResult<std::collections::HashMap<String, RatingSummary>> {
    let rows: Vec<(String, i32)> = review::Entity::find()
        .select_only()
        .column(review::Column::CourseId)
        .column(review::Column::Rating)
        .filter(review::Column::CourseId.is_in(course_ids.iter().cloned()))
        .into_tuple()
        .all(db)
        .await?;
    let mut grouped: std::collections::HashMap<String, Vec<i32>> = std::collections::HashMap::new();
    for (course_id, rating) in rows {
        grouped.entry(course_id).or_default().push(rating);
    }
    Ok(course_ids
        .iter()
        .map(|id| {
            let ratings = grouped.get(id).map(Vec::as_slice).unwrap_or(&[]);
            (id.clone(), RatingSummary::from_ratings(ratings))
        })
        .collect())
}
