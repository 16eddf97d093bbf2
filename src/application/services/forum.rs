//! Course discussion forum

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Serialize;
use tracing::info;

use super::{ensure_participant, load_course, new_id, required};
use crate::domain::Actor;
use crate::infrastructure::database::entities::{forum_post, forum_reply};
use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Serialize)]
pub struct PostWithReplies {
    #[serde(flatten)]
    pub post: forum_post::Model,
    pub replies: Vec<forum_reply::Model>,
}

pub struct ForumService {
    db: DatabaseConnection,
}

impl ForumService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_post(&self, actor: &Actor, course_id: &str, title: &str, body: &str) -> DomainResult<forum_post::Model> {
        let course = load_course(&self.db, course_id).await?;
        ensure_participant(&self.db, actor, &course).await?;
        let now = Utc::now();
        let post = forum_post::ActiveModel {
            id: Set(new_id()),
            course_id: Set(course_id.to_string()),
            author_id: Set(actor.user_id.clone()),
            title: Set(required("title", title)?),
            body: Set(required("body", body)?),
            upvotes: Set(0),
            best_reply_id: Set(None),
            is_pinned: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;
        info!(post_id = %post.id, course_id, "Forum post created");
        Ok(post)
    }

    /// Pinned posts first, then newest.
    pub async fn list_posts(&self, course_id: &str) -> DomainResult<Vec<forum_post::Model>> {
        Ok(forum_post::Entity::find()
            .filter(forum_post::Column::CourseId.eq(course_id))
            .order_by_desc(forum_post::Column::IsPinned)
            .order_by_desc(forum_post::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    pub async fn get_post(&self, post_id: &str) -> DomainResult<PostWithReplies> {
        let post = self.load_post(post_id).await?;
        let replies = forum_reply::Entity::find()
            .filter(forum_reply::Column::PostId.eq(post_id))
            .order_by_desc(forum_reply::Column::IsBest)
            .order_by_asc(forum_reply::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(PostWithReplies { post, replies })
    }

    pub async fn reply(&self, actor: &Actor, post_id: &str, body: &str) -> DomainResult<forum_reply::Model> {
        let post = self.load_post(post_id).await?;
        let course = load_course(&self.db, &post.course_id).await?;
        ensure_participant(&self.db, actor, &course).await?;
        Ok(forum_reply::ActiveModel {
            id: Set(new_id()),
            post_id: Set(post_id.to_string()),
            author_id: Set(actor.user_id.clone()),
            body: Set(required("body", body)?),
            upvotes: Set(0),
            is_best: Set(false),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?)
    }

    pub async fn upvote_post(&self, post_id: &str) -> DomainResult<forum_post::Model> {
        let res = forum_post::Entity::update_many()
            .col_expr(forum_post::Column::Upvotes, Expr::col(forum_post::Column::Upvotes).add(1))
            .filter(forum_post::Column::Id.eq(post_id))
            .exec(&self.db)
            .await?;
        if res.rows_affected == 0 {
            return Err(DomainError::not_found("Forum post", post_id));
        }
        self.load_post(post_id).await
    }

    pub async fn upvote_reply(&self, reply_id: &str) -> DomainResult<forum_reply::Model> {
        let res = forum_reply::Entity::update_many()
            .col_expr(forum_reply::Column::Upvotes, Expr::col(forum_reply::Column::Upvotes).add(1))
            .filter(forum_reply::Column::Id.eq(reply_id))
            .exec(&self.db)
            .await?;
        if res.rows_affected == 0 {
            return Err(DomainError::not_found("Forum reply", reply_id));
        }
        self.load_reply(reply_id).await
    }

    /// Post author or course teacher. Replaces any previous best answer.
    pub async fn mark_best_answer(&self, actor: &Actor, post_id: &str, reply_id: &str) -> DomainResult<PostWithReplies> {
        let post = self.load_post(post_id).await?;
        let course = load_course(&self.db, &post.course_id).await?;
        if post.author_id != actor.user_id && !actor.owns(&course.teacher_id) {
            return Err(DomainError::forbidden("Only the author or the course teacher can pick the best answer"));
        }
        let reply = self.load_reply(reply_id).await?;
        if reply.post_id != post_id {
            return Err(DomainError::validation("Reply belongs to another post"));
        }

        let txn = self.db.begin().await?;
        forum_reply::Entity::update_many()
            .col_expr(forum_reply::Column::IsBest, Expr::value(false))
            .filter(forum_reply::Column::PostId.eq(post_id))
            .exec(&txn)
            .await?;
        let mut best: forum_reply::ActiveModel = reply.into();
        best.is_best = Set(true);
        best.update(&txn).await?;
        let mut active: forum_post::ActiveModel = post.into();
        active.best_reply_id = Set(Some(reply_id.to_string()));
        active.updated_at = Set(Utc::now());
        active.update(&txn).await?;
        txn.commit().await?;

        info!(post_id, reply_id, "Best answer marked");
        self.get_post(post_id).await
    }

    /// Course teacher only.
    pub async fn set_pinned(&self, actor: &Actor, post_id: &str, pinned: bool) -> DomainResult<forum_post::Model> {
        let post = self.load_post(post_id).await?;
        let course = load_course(&self.db, &post.course_id).await?;
        actor.ensure_owns(&course.teacher_id, "course")?;
        let mut active: forum_post::ActiveModel = post.into();
        active.is_pinned = Set(pinned);
        active.updated_at = Set(Utc::now());
        Ok(active.update(&self.db).await?)
    }

    pub async fn delete_post(&self, actor: &Actor, post_id: &str) -> DomainResult<()> {
        let post = self.load_post(post_id).await?;
        let course = load_course(&self.db, &post.course_id).await?;
        if post.author_id != actor.user_id && !actor.owns(&course.teacher_id) {
            return Err(DomainError::forbidden("You cannot delete this post"));
        }
        let txn = self.db.begin().await?;
        forum_reply::Entity::delete_many()
            .filter(forum_reply::Column::PostId.eq(post_id))
            .exec(&txn)
            .await?;
        forum_post::Entity::delete_by_id(post_id.to_string()).exec(&txn).await?;
        txn.commit().await?;
        info!(post_id, "Forum post deleted");
        Ok(())
    }

    pub async fn delete_reply(&self, actor: &Actor, reply_id: &str) -> DomainResult<()> {
        let reply = self.load_reply(reply_id).await?;
        let post = self.load_post(&reply.post_id).await?;
        let course = load_course(&self.db, &post.course_id).await?;
        if reply.author_id != actor.user_id && !actor.owns(&course.teacher_id) {
            return Err(DomainError::forbidden("You cannot delete this reply"));
        }
        let txn = self.db.begin().await?;
        if post.best_reply_id.as_deref() == Some(reply_id) {
            let mut active: forum_post::ActiveModel = post.into();
            active.best_reply_id = Set(None);
            active.update(&txn).await?;
        }
        forum_reply::Entity::delete_by_id(reply_id.to_string()).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    async fn load_post(&self, post_id: &str) -> DomainResult<forum_post::Model> {
        forum_post::Entity::find_by_id(post_id.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Forum post", post_id))
    }

    async fn load_reply(&self, reply_id: &str) -> DomainResult<forum_reply::Model> {
        forum_reply::Entity::find_by_id(reply_id.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Forum reply", reply_id))
    }
}
