use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub use crate::domain::coupon::DiscountType;
use crate::domain::coupon::CouponRules;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "coupons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub code: String,
    pub discount_type: DiscountType,
    /// Percent (1..=100) or cents, depending on `discount_type`
    pub value: i64,
    #[sea_orm(nullable)]
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub min_purchase_cents: i64,
    #[sea_orm(nullable)]
    pub course_id: Option<String>,
    #[sea_orm(nullable)]
    pub valid_from: Option<DateTimeUtc>,
    #[sea_orm(nullable)]
    pub expires_at: Option<DateTimeUtc>,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

impl Model {
    pub fn rules(&self) -> CouponRules {
        CouponRules {
            discount_type: self.discount_type,
            value: self.value,
            max_uses: self.max_uses,
            used_count: self.used_count,
            min_purchase_cents: self.min_purchase_cents,
            course_id: self.course_id.clone(),
            valid_from: self.valid_from,
            expires_at: self.expires_at,
            is_active: self.is_active,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::coupon_redemption::Entity")]
    Redemptions,
}

impl Related<super::coupon_redemption::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Redemptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
