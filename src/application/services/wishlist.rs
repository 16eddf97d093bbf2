//! Saved-for-later courses

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Serialize;

use super::load_course;
use crate::infrastructure::database::entities::{course, wishlist_item};
use crate::shared::errors::DomainResult;

#[derive(Debug, Clone, Serialize)]
pub struct WishlistEntry {
    pub added_at: chrono::DateTime<Utc>,
    pub course: course::Model,
}

pub struct WishlistService {
    db: DatabaseConnection,
}

impl WishlistService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Adding a course twice keeps the original entry.
    pub async fn add(&self, user_id: &str, course_id: &str) -> DomainResult<wishlist_item::Model> {
        load_course(&self.db, course_id).await?;
        if let Some(existing) = self.find(user_id, course_id).await? {
            return Ok(existing);
        }
        Ok(wishlist_item::ActiveModel {
            user_id: Set(user_id.to_string()),
            course_id: Set(course_id.to_string()),
            added_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?)
    }

    /// Returns whether an entry was removed.
    pub async fn remove(&self, user_id: &str, course_id: &str) -> DomainResult<bool> {
        let res = wishlist_item::Entity::delete_by_id((user_id.to_string(), course_id.to_string()))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }

    pub async fn list(&self, user_id: &str) -> DomainResult<Vec<WishlistEntry>> {
        let items = wishlist_item::Entity::find()
            .filter(wishlist_item::Column::UserId.eq(user_id))
            .order_by_desc(wishlist_item::Column::AddedAt)
            .all(&self.db)
            .await?;
        let ids: Vec<String> = items.iter().map(|i| i.course_id.clone()).collect();
        let mut courses: HashMap<String, course::Model> = course::Entity::find()
            .filter(course::Column::Id.is_in(ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();
        Ok(items
            .into_iter()
            .filter_map(|i| {
                courses.remove(&i.course_id).map(|course| WishlistEntry {
                    added_at: i.added_at,
                    course,
                })
            })
            .collect())
    }

    pub async fn contains(&self, user_id: &str, course_id: &str) -> DomainResult<bool> {
        Ok(self.find(user_id, course_id).await?.is_some())
    }

    async fn find(&self, user_id: &str, course_id: &str) -> DomainResult<Option<wishlist_item::Model>> {
        Ok(wishlist_item::Entity::find_by_id((user_id.to_string(), course_id.to_string()))
            .one(&self.db)
            .await?)
    }
}
