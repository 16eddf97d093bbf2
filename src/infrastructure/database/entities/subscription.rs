use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub use crate::domain::monetization::SubscriptionStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub plan: String,
    pub status: SubscriptionStatus,
    pub current_period_start: DateTimeUtc,
    pub current_period_end: DateTimeUtc,
    #[sea_orm(nullable)]
    pub cancelled_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
