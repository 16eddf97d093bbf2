//! Course tags

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;

use super::{load_owned_course, new_id, required};
use crate::domain::course::slugify;
use crate::domain::Actor;
use crate::infrastructure::database::entities::{course, course_tag, tag};
use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Serialize)]
pub struct TagWithCount {
    #[serde(flatten)]
    pub tag: tag::Model,
    pub course_count: u64,
}

pub struct TagService {
    db: DatabaseConnection,
}

impl TagService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, actor: &Actor, name: &str) -> DomainResult<tag::Model> {
        actor.ensure_teacher()?;
        let name = required("name", name)?;
        if find_by_name(&self.db, &name).await?.is_some() {
            return Err(DomainError::Conflict(format!("Tag '{}' already exists", name)));
        }
        insert_tag(&self.db, &name).await
    }

    pub async fn list(&self) -> DomainResult<Vec<TagWithCount>> {
        let tags = tag::Entity::find().order_by_asc(tag::Column::NameKey).all(&self.db).await?;
        let counts = usage_counts(&self.db).await?;
        Ok(tags
            .into_iter()
            .map(|t| TagWithCount {
                course_count: counts.get(&t.id).copied().unwrap_or(0),
                tag: t,
            })
            .collect())
    }

    /// Attach tags by name, creating the ones that do not exist yet.
    pub async fn attach(&self, actor: &Actor, course_id: &str, names: &[String]) -> DomainResult<Vec<tag::Model>> {
        load_owned_course(&self.db, actor, course_id).await?;
        let txn = self.db.begin().await?;
        for raw in names {
            let Ok(name) = required("tag", raw) else { continue };
            let found = match find_by_name(&txn, &name).await? {
                Some(t) => t,
                None => insert_tag(&txn, &name).await?,
            };
            let linked = course_tag::Entity::find_by_id((course_id.to_string(), found.id.clone()))
                .one(&txn)
                .await?;
            if linked.is_none() {
                course_tag::ActiveModel {
                    course_id: Set(course_id.to_string()),
                    tag_id: Set(found.id),
                }
                .insert(&txn)
                .await?;
            }
        }
        txn.commit().await?;
        self.course_tags(course_id).await
    }

    pub async fn detach(&self, actor: &Actor, course_id: &str, tag_id: &str) -> DomainResult<()> {
        load_owned_course(&self.db, actor, course_id).await?;
        course_tag::Entity::delete_by_id((course_id.to_string(), tag_id.to_string()))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    pub async fn course_tags(&self, course_id: &str) -> DomainResult<Vec<tag::Model>> {
        let ids: Vec<String> = course_tag::Entity::find()
            .filter(course_tag::Column::CourseId.eq(course_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|ct| ct.tag_id)
            .collect();
        Ok(tag::Entity::find()
            .filter(tag::Column::Id.is_in(ids))
            .order_by_asc(tag::Column::NameKey)
            .all(&self.db)
            .await?)
    }

    /// Published courses carrying the tag with `slug`.
    pub async fn courses_by_tag(&self, slug: &str) -> DomainResult<Vec<course::Model>> {
        let found = tag::Entity::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "Tag",
                field: "slug",
                value: slug.to_string(),
            })?;
        let course_ids: Vec<String> = course_tag::Entity::find()
            .filter(course_tag::Column::TagId.eq(found.id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|ct| ct.course_id)
            .collect();
        Ok(course::Entity::find()
            .filter(course::Column::Id.is_in(course_ids))
            .filter(course::Column::Status.eq(crate::domain::course::CourseStatus::Published))
            .order_by_asc(course::Column::Title)
            .all(&self.db)
            .await?)
    }

    /// Most used tags first.
    pub async fn popular(&self, limit: usize) -> DomainResult<Vec<TagWithCount>> {
        let mut all = self.list().await?;
        all.retain(|t| t.course_count > 0);
        all.sort_by(|a, b| b.course_count.cmp(&a.course_count).then_with(|| a.tag.name_key.cmp(&b.tag.name_key)));
        all.truncate(limit);
        Ok(all)
    }

    pub async fn delete(&self, actor: &Actor, tag_id: &str) -> DomainResult<()> {
        actor.ensure_admin()?;
        let res = tag::Entity::delete_by_id(tag_id.to_string()).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(DomainError::not_found("Tag", tag_id));
        }
        Ok(())
    }
}

async fn find_by_name<C: ConnectionTrait>(db: &C, name: &str) -> DomainResult<Option<tag::Model>> {
    Ok(tag::Entity::find()
        .filter(tag::Column::NameKey.eq(name.to_lowercase()))
        .one(db)
        .await?)
}

async fn insert_tag<C: ConnectionTrait>(db: &C, name: &str) -> DomainResult<tag::Model> {
    Ok(tag::ActiveModel {
        id: Set(new_id()),
        name: Set(name.to_string()),
        name_key: Set(name.to_lowercase()),
        slug: Set(slugify(name)),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await?)
}

async fn usage_counts<C: ConnectionTrait>(db: &C) -> DomainResult<HashMap<String, u64>> {
    let mut counts = HashMap::new();
    for link in course_tag::Entity::find().all(db).await? {
        *counts.entry(link.tag_id).or_insert(0) += 1;
    }
    Ok(counts)
}
