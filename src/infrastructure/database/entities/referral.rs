use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub use crate::domain::referral::ReferralStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "referrals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub referrer_id: String,
    /// A user can be referred only once
    #[sea_orm(unique)]
    pub referred_id: String,
    pub code: String,
    pub status: ReferralStatus,
    pub reward_cents: i64,
    pub created_at: DateTimeUtc,
    #[sea_orm(nullable)]
    pub converted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
