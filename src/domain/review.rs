//! Ratings

use serde::{Deserialize, Serialize};

use crate::shared::errors::{DomainError, DomainResult};

pub fn validate_rating(rating: i32) -> DomainResult<i32> {
    if (1..=5).contains(&rating) {
        Ok(rating)
    } else {
        Err(DomainError::validation("Rating must be between 1 and 5"))
    }
}

/// Aggregate of a course's ratings. `distribution[i]` counts `i + 1` stars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub average: f64,
    pub count: u64,
    pub distribution: [u64; 5],
}

impl RatingSummary {
    pub fn from_ratings(ratings: &[i32]) -> Self {
        let mut distribution = [0u64; 5];
        let mut sum = 0i64;
        let mut count = 0u64;
        for r in ratings.iter().copied().filter(|r| (1..=5).contains(r)) {
            distribution[(r - 1) as usize] += 1;
            sum += r as i64;
            count += 1;
        }
        let average = if count > 0 {
            ((sum as f64 / count as f64) * 100.0).round() / 100.0
        } else {
            0.0
        };
        Self {
            average,
            count,
            distribution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_each_star() {
        let s = RatingSummary::from_ratings(&[5, 4, 4, 1]);
        assert_eq!(s.count, 4);
        assert_eq!(s.distribution, [1, 0, 0, 2, 1]);
        assert!((s.average - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_summary() {
        let s = RatingSummary::from_ratings(&[]);
        assert_eq!(s.count, 0);
        assert_eq!(s.average, 0.0);
    }

    #[test]
    fn rating_bounds() {
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
        assert_eq!(validate_rating(5).unwrap(), 5);
    }
}
