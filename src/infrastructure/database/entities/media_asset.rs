//! Uploaded files, Stream videos and live inputs

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub use crate::domain::media::{MediaKind, MediaStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "media_assets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    #[sea_orm(nullable)]
    pub course_id: Option<String>,
    pub kind: MediaKind,
    /// Object storage key (FILE)
    #[sea_orm(nullable)]
    pub object_key: Option<String>,
    /// Stream video or live input uid (VIDEO, LIVE)
    #[sea_orm(nullable)]
    pub stream_uid: Option<String>,
    #[sea_orm(nullable)]
    pub file_name: Option<String>,
    #[sea_orm(nullable)]
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub status: MediaStatus,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id",
        on_delete = "SetNull"
    )]
    Course,
}

impl ActiveModelBehavior for ActiveModel {}
