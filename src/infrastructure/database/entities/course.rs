//! Course entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub use crate::domain::course::{CourseLevel, CourseStatus};
pub use crate::domain::monetization::MonetizationType;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub teacher_id: String,
    #[sea_orm(nullable)]
    pub category: Option<String>,
    pub level: CourseLevel,
    pub language: String,
    /// Price in minor currency units
    pub price_cents: i64,
    pub currency: String,
    pub monetization_type: MonetizationType,
    pub status: CourseStatus,
    /// Maximum live enrollments; `None` is unlimited
    #[sea_orm(nullable)]
    pub capacity: Option<i32>,
    #[sea_orm(nullable)]
    pub thumbnail_url: Option<String>,
    /// Set for courses created by a catalog import
    #[sea_orm(nullable)]
    pub source_provider: Option<String>,
    #[sea_orm(nullable)]
    pub external_id: Option<String>,
    #[sea_orm(nullable)]
    pub published_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::course_module::Entity")]
    Modules,
    #[sea_orm(has_many = "super::lesson::Entity")]
    Lessons,
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollments,
}

impl Related<super::course_module::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Modules.def()
    }
}

impl Related<super::lesson::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lessons.def()
    }
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
