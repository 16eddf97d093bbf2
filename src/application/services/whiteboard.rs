//! Shared course whiteboards with ordered drawing actions

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use sea_orm::sea_query::Expr;
use tracing::info;

use super::{ensure_participant, load_course, load_owned_course, new_id, required};
use crate::domain::whiteboard::ensure_can_draw;
use crate::domain::Actor;
use crate::infrastructure::database::entities::{whiteboard, whiteboard_action};
use crate::shared::errors::{DomainError, DomainResult};

pub struct WhiteboardService {
    db: DatabaseConnection,
}

impl WhiteboardService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, actor: &Actor, course_id: &str, title: &str) -> DomainResult<whiteboard::Model> {
        load_owned_course(&self.db, actor, course_id).await?;
        let now = Utc::now();
        let board = whiteboard::ActiveModel {
            id: Set(new_id()),
            course_id: Set(course_id.to_string()),
            title: Set(required("title", title)?),
            created_by: Set(actor.user_id.clone()),
            is_locked: Set(false),
            last_seq: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;
        info!(whiteboard_id = %board.id, course_id, "Whiteboard created");
        Ok(board)
    }

    pub async fn get(&self, actor: &Actor, whiteboard_id: &str) -> DomainResult<whiteboard::Model> {
        let board = self.load(whiteboard_id).await?;
        let course = load_course(&self.db, &board.course_id).await?;
        ensure_participant(&self.db, actor, &course).await?;
        Ok(board)
    }

    /// Append an action. `seq` comes from the board's counter, bumped inside
    /// the transaction, so it keeps increasing across clears.
    pub async fn append_action(
        &self,
        actor: &Actor,
        whiteboard_id: &str,
        kind: &str,
        payload: serde_json::Value,
    ) -> DomainResult<whiteboard_action::Model> {
        let board = self.get(actor, whiteboard_id).await?;
        ensure_can_draw(board.is_locked, &board.created_by, &actor.user_id)?;
        let kind = required("kind", kind)?;

        let txn = self.db.begin().await?;
        whiteboard::Entity::update_many()
            .col_expr(whiteboard::Column::LastSeq, Expr::col(whiteboard::Column::LastSeq).add(1))
            .filter(whiteboard::Column::Id.eq(whiteboard_id))
            .exec(&txn)
            .await?;
        let seq = whiteboard::Entity::find_by_id(whiteboard_id.to_string())
            .one(&txn)
            .await?
            .ok_or_else(|| DomainError::not_found("Whiteboard", whiteboard_id))?
            .last_seq;
        let action = whiteboard_action::ActiveModel {
            id: Set(new_id()),
            whiteboard_id: Set(whiteboard_id.to_string()),
            user_id: Set(actor.user_id.clone()),
            seq: Set(seq),
            kind: Set(kind),
            payload: Set(payload),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;
        Ok(action)
    }

    /// Actions with `seq` greater than `after`, in order.
    pub async fn actions_since(&self, actor: &Actor, whiteboard_id: &str, after: i64) -> DomainResult<Vec<whiteboard_action::Model>> {
        self.get(actor, whiteboard_id).await?;
        Ok(whiteboard_action::Entity::find()
            .filter(whiteboard_action::Column::WhiteboardId.eq(whiteboard_id))
            .filter(whiteboard_action::Column::Seq.gt(after))
            .order_by_asc(whiteboard_action::Column::Seq)
            .all(&self.db)
            .await?)
    }

    /// Creator only. Returns the number of deleted actions; numbering carries on
    /// from the board's last seq.
    pub async fn clear(&self, actor: &Actor, whiteboard_id: &str) -> DomainResult<u64> {
        let board = self.load(whiteboard_id).await?;
        actor.ensure_owns(&board.created_by, "whiteboard")?;
        let res = whiteboard_action::Entity::delete_many()
            .filter(whiteboard_action::Column::WhiteboardId.eq(whiteboard_id))
            .exec(&self.db)
            .await?;
        info!(whiteboard_id, removed = res.rows_affected, "Whiteboard cleared");
        Ok(res.rows_affected)
    }

    pub async fn set_locked(&self, actor: &Actor, whiteboard_id: &str, locked: bool) -> DomainResult<whiteboard::Model> {
        let board = self.load(whiteboard_id).await?;
        actor.ensure_owns(&board.created_by, "whiteboard")?;
        let mut active: whiteboard::ActiveModel = board.into();
        active.is_locked = Set(locked);
        active.updated_at = Set(Utc::now());
        Ok(active.update(&self.db).await?)
    }

    pub async fn list_for_course(&self, course_id: &str) -> DomainResult<Vec<whiteboard::Model>> {
        Ok(whiteboard::Entity::find()
            .filter(whiteboard::Column::CourseId.eq(course_id))
            .order_by_desc(whiteboard::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn load(&self, whiteboard_id: &str) -> DomainResult<whiteboard::Model> {
        whiteboard::Entity::find_by_id(whiteboard_id.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Whiteboard", whiteboard_id))
    }
}
