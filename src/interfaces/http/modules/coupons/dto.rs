use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::services::coupons::NewCoupon;
use crate::domain::coupon::DiscountType;
use crate::interfaces::http::common::{parse_enum, ApiError};

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateCouponRequest {
    #[validate(length(min = 3, max = 64))]
    pub code: String,
    /// PERCENT or FIXED
    pub discount_type: String,
    /// Percent (1-100) or cents
    #[validate(range(min = 1))]
    pub value: i64,
    #[validate(range(min = 1))]
    pub max_uses: Option<i32>,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub min_purchase_cents: i64,
    pub course_id: Option<String>,
    pub valid_from: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CreateCouponRequest {
    pub fn into_new_coupon(self) -> Result<NewCoupon, ApiError> {
        Ok(NewCoupon {
            code: self.code,
            discount_type: parse_enum::<DiscountType>(&self.discount_type)?,
            value: self.value,
            max_uses: self.max_uses,
            min_purchase_cents: self.min_purchase_cents,
            course_id: self.course_id,
            valid_from: self.valid_from,
            expires_at: self.expires_at,
        })
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ValidateCouponParams {
    pub code: String,
    pub amount_cents: i64,
    pub course_id: Option<String>,
}
