//! Trackable course share links

use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Serialize;
use tracing::{debug, info};

use super::{load_course, load_owned_course, new_id};
use crate::domain::share::{generate_token, normalize_channel};
use crate::domain::Actor;
use crate::infrastructure::database::entities::share_link;
use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Serialize)]
pub struct ShareResolution {
    pub course_id: String,
    pub course_slug: String,
    pub clicks: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareStats {
    pub course_id: String,
    pub links: usize,
    pub total_clicks: i64,
    pub clicks_by_channel: BTreeMap<String, i64>,
}

pub struct ShareService {
    db: DatabaseConnection,
}

impl ShareService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Reuses the existing link for the same user, course and channel.
    pub async fn create(&self, actor: &Actor, course_id: &str, channel: Option<&str>) -> DomainResult<share_link::Model> {
        load_course(&self.db, course_id).await?;
        let channel = normalize_channel(channel)?;
        let existing = share_link::Entity::find()
            .filter(share_link::Column::UserId.eq(&actor.user_id))
            .filter(share_link::Column::CourseId.eq(course_id))
            .filter(share_link::Column::Channel.eq(&channel))
            .one(&self.db)
            .await?;
        if let Some(link) = existing {
            debug!(token = %link.token, "Reusing share link");
            return Ok(link);
        }
        let token = generate_token(&mut rand::thread_rng());
        let link = share_link::ActiveModel {
            id: Set(new_id()),
            course_id: Set(course_id.to_string()),
            user_id: Set(actor.user_id.clone()),
            channel: Set(channel),
            token: Set(token),
            clicks: Set(0),
            created_at: Set(Utc::now()),
            last_clicked_at: Set(None),
        }
        .insert(&self.db)
        .await?;
        info!(course_id, channel = %link.channel, "Share link created");
        Ok(link)
    }

    /// Count a click and return where the link points.
    pub async fn resolve(&self, token: &str) -> DomainResult<ShareResolution> {
        let res = share_link::Entity::update_many()
            .col_expr(share_link::Column::Clicks, Expr::col(share_link::Column::Clicks).add(1))
            .col_expr(share_link::Column::LastClickedAt, Expr::value(Some(Utc::now())))
            .filter(share_link::Column::Token.eq(token))
            .exec(&self.db)
            .await?;
        if res.rows_affected == 0 {
            return Err(DomainError::NotFound {
                entity: "Share link",
                field: "token",
                value: token.to_string(),
            });
        }
        let link = share_link::Entity::find()
            .filter(share_link::Column::Token.eq(token))
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Share link", token))?;
        let course = load_course(&self.db, &link.course_id).await?;
        Ok(ShareResolution {
            course_id: course.id,
            course_slug: course.slug,
            clicks: link.clicks,
        })
    }

    /// Course owner view of click totals.
    pub async fn stats(&self, actor: &Actor, course_id: &str) -> DomainResult<ShareStats> {
        load_owned_course(&self.db, actor, course_id).await?;
        let links = share_link::Entity::find()
            .filter(share_link::Column::CourseId.eq(course_id))
            .all(&self.db)
            .await?;
        let mut clicks_by_channel = BTreeMap::new();
        for link in &links {
            *clicks_by_channel.entry(link.channel.clone()).or_insert(0) += link.clicks;
        }
        Ok(ShareStats {
            course_id: course_id.to_string(),
            links: links.len(),
            total_clicks: clicks_by_channel.values().sum(),
            clicks_by_channel,
        })
    }
}
