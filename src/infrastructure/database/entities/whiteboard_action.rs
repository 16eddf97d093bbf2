use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Unique on (whiteboard_id, seq).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "whiteboard_actions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub whiteboard_id: String,
    pub user_id: String,
    pub seq: i64,
    /// Drawing primitive, e.g. "stroke", "text", "erase"
    pub kind: String,
    pub payload: Json,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::whiteboard::Entity",
        from = "Column::WhiteboardId",
        to = "super::whiteboard::Column::Id",
        on_delete = "Cascade"
    )]
    Whiteboard,
}

impl ActiveModelBehavior for ActiveModel {}
