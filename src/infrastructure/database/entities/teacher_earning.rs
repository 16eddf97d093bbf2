use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub use crate::domain::earnings::{EarningSource, EarningStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "teacher_earnings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub teacher_id: String,
    pub course_id: String,
    /// Buyer whose payment produced this earning
    #[sea_orm(nullable)]
    pub student_id: Option<String>,
    pub source: EarningSource,
    pub payment_id: String,
    pub gross_cents: i64,
    pub share_cents: i64,
    pub status: EarningStatus,
    pub created_at: DateTimeUtc,
    #[sea_orm(nullable)]
    pub paid_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
