//! Bundle pricing

use serde::Serialize;

use crate::shared::errors::{DomainError, DomainResult};

pub const MIN_BUNDLE_COURSES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BundlePricing {
    pub original_cents: i64,
    pub price_cents: i64,
    pub savings_cents: i64,
}

impl BundlePricing {
    pub fn compute(course_prices: &[i64], discount_percent: i32) -> Self {
        let original: i64 = course_prices.iter().copied().map(|p| p.max(0)).sum();
        let pct = discount_percent.clamp(0, 100) as i64;
        let savings = original * pct / 100;
        Self {
            original_cents: original,
            price_cents: original - savings,
            savings_cents: savings,
        }
    }
}

pub fn validate_discount(discount_percent: i32) -> DomainResult<()> {
    if (0..=90).contains(&discount_percent) {
        Ok(())
    } else {
        Err(DomainError::validation(
            "Bundle discount must be between 0 and 90 percent",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pricing_sums_and_discounts() {
        let p = BundlePricing::compute(&[4_000, 6_000], 20);
        assert_eq!(p.original_cents, 10_000);
        assert_eq!(p.savings_cents, 2_000);
        assert_eq!(p.price_cents, 8_000);
    }

    #[test]
    fn free_courses_count_as_zero() {
        let p = BundlePricing::compute(&[0, 3_000], 10);
        assert_eq!(p.price_cents, 2_700);
    }

    #[test]
    fn discount_bounds() {
        assert!(validate_discount(95).is_err());
        assert!(validate_discount(-1).is_err());
        assert!(validate_discount(30).is_ok());
    }
}
