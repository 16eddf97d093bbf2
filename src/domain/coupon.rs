//! Coupon validation and discount arithmetic

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    #[sea_orm(string_value = "PERCENT")]
    Percent,
    #[sea_orm(string_value = "FIXED")]
    Fixed,
}

impl std::fmt::Display for DiscountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Percent => "PERCENT",
            Self::Fixed => "FIXED",
        })
    }
}

impl std::str::FromStr for DiscountType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PERCENT" => Ok(Self::Percent),
            "FIXED" => Ok(Self::Fixed),
            other => Err(DomainError::validation(format!("Unknown discount type: {}", other))),
        }
    }
}

/// Normalised coupon code: trimmed and upper-cased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// The coupon fields that decide whether it applies to a purchase.
#[derive(Debug, Clone)]
pub struct CouponRules {
    pub discount_type: DiscountType,
    pub value: i64,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub min_purchase_cents: i64,
    pub course_id: Option<String>,
    pub valid_from: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// Discount applied to one purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiscountQuote {
    pub amount_cents: i64,
    pub discount_cents: i64,
    pub final_cents: i64,
}

impl DiscountQuote {
    pub fn none(amount_cents: i64) -> Self {
        Self {
            amount_cents,
            discount_cents: 0,
            final_cents: amount_cents,
        }
    }
}

pub fn validate_definition(discount_type: DiscountType, value: i64) -> DomainResult<()> {
    match discount_type {
        DiscountType::Percent if !(1..=100).contains(&value) => Err(DomainError::validation(
            "Percent discount must be between 1 and 100",
        )),
        DiscountType::Fixed if value <= 0 => Err(DomainError::validation(
            "Fixed discount must be positive",
        )),
        _ => Ok(()),
    }
}

impl CouponRules {
    /// Check every redemption rule against a purchase and compute the discount.
    pub fn quote(
        &self,
        course_id: Option<&str>,
        amount_cents: i64,
        now: DateTime<Utc>,
    ) -> DomainResult<DiscountQuote> {
        if !self.is_active {
            return Err(DomainError::validation("Coupon is not active"));
        }
        if let Some(from) = self.valid_from {
            if now < from {
                return Err(DomainError::validation("Coupon is not valid yet"));
            }
        }
        if let Some(expires) = self.expires_at {
            if now > expires {
                return Err(DomainError::validation("Coupon has expired"));
            }
        }
        if let Some(max) = self.max_uses {
            if self.used_count >= max {
                return Err(DomainError::validation("Coupon usage limit reached"));
            }
        }
        if let Some(scope) = &self.course_id {
            if course_id != Some(scope.as_str()) {
                return Err(DomainError::validation("Coupon not valid for this course"));
            }
        }
        if amount_cents < self.min_purchase_cents {
            return Err(DomainError::validation("Minimum purchase not met"));
        }

        let discount = compute_discount(self.discount_type, self.value, amount_cents);
        Ok(DiscountQuote {
            amount_cents,
            discount_cents: discount,
            final_cents: amount_cents - discount,
        })
    }
}

/// Discount in cents, never above the purchase amount and never negative.
pub fn compute_discount(discount_type: DiscountType, value: i64, amount_cents: i64) -> i64 {
    if amount_cents <= 0 {
        return 0;
    }
    let raw = match discount_type {
        DiscountType::Percent => amount_cents * value.clamp(0, 100) / 100,
        DiscountType::Fixed => value.max(0),
    };
    raw.min(amount_cents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn rules() -> CouponRules {
        CouponRules {
            discount_type: DiscountType::Percent,
            value: 25,
            max_uses: Some(2),
            used_count: 0,
            min_purchase_cents: 0,
            course_id: None,
            valid_from: None,
            expires_at: None,
            is_active: true,
        }
    }

    #[test]
    fn percent_discount() {
        let q = rules().quote(None, 10_000, Utc::now()).unwrap();
        assert_eq!(q.discount_cents, 2_500);
        assert_eq!(q.final_cents, 7_500);
    }

    #[test]
    fn fixed_discount_never_exceeds_amount() {
        assert_eq!(compute_discount(DiscountType::Fixed, 5_000, 1_999), 1_999);
        let mut r = rules();
        r.discount_type = DiscountType::Fixed;
        r.value = 50_000;
        let q = r.quote(None, 3_000, Utc::now()).unwrap();
        assert_eq!(q.final_cents, 0);
    }

    #[test]
    fn expired_coupon() {
        let mut r = rules();
        r.expires_at = Some(Utc::now() - Duration::minutes(1));
        let err = r.quote(None, 1_000, Utc::now()).unwrap_err();
        assert_eq!(err.to_string(), "Validation: Coupon has expired");
    }

    #[test]
    fn usage_limit() {
        let mut r = rules();
        r.used_count = 2;
        assert!(r.quote(None, 1_000, Utc::now()).is_err());
    }

    #[test]
    fn course_scope_and_minimum() {
        let mut r = rules();
        r.course_id = Some("c1".into());
        assert!(r.quote(Some("c2"), 1_000, Utc::now()).is_err());
        assert!(r.quote(Some("c1"), 1_000, Utc::now()).is_ok());
        r.min_purchase_cents = 5_000;
        assert!(r.quote(Some("c1"), 1_000, Utc::now()).is_err());
    }

    #[test]
    fn definition_bounds() {
        assert!(validate_definition(DiscountType::Percent, 0).is_err());
        assert!(validate_definition(DiscountType::Percent, 101).is_err());
        assert!(validate_definition(DiscountType::Fixed, 1).is_ok());
    }

    #[test]
    fn code_normalisation() {
        assert_eq!(normalize_code("  spring24 "), "SPRING24");
    }
}
