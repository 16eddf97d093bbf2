//! Payment entity
//!
//! Exactly one of `course_id`, `bundle_id` and `lesson_id` names what was
//! bought; lesson purchases also carry the lesson's `course_id`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub use crate::domain::payment::PaymentStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    #[sea_orm(nullable)]
    pub course_id: Option<String>,
    #[sea_orm(nullable)]
    pub bundle_id: Option<String>,
    #[sea_orm(nullable)]
    pub lesson_id: Option<String>,
    pub amount_cents: i64,
    pub discount_cents: i64,
    pub final_cents: i64,
    pub currency: String,
    #[sea_orm(nullable)]
    pub coupon_code: Option<String>,
    pub status: PaymentStatus,
    /// Reference returned by the external payment provider
    #[sea_orm(nullable)]
    pub provider_ref: Option<String>,
    pub created_at: DateTimeUtc,
    #[sea_orm(nullable)]
    pub completed_at: Option<DateTimeUtc>,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
