//! Enrollment status and progress

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Counts as a seat and as access to course content.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Active | Self::Completed)
    }
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn validate_progress(percent: i32) -> DomainResult<i32> {
    if (0..=100).contains(&percent) {
        Ok(percent)
    } else {
        Err(DomainError::validation("Progress must be between 0 and 100"))
    }
}

/// Rounded-down completion percentage.
pub fn progress_from_lessons(completed: u64, total: u64) -> i32 {
    if total == 0 {
        return 0;
    }
    ((completed.min(total) * 100) / total) as i32
}

pub fn has_capacity(capacity: Option<i32>, live_enrollments: u64) -> bool {
    match capacity {
        Some(cap) => (live_enrollments as i64) < cap as i64,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_rounds_down() {
        assert_eq!(progress_from_lessons(1, 3), 33);
        assert_eq!(progress_from_lessons(3, 3), 100);
        assert_eq!(progress_from_lessons(5, 3), 100);
        assert_eq!(progress_from_lessons(0, 0), 0);
    }

    #[test]
    fn capacity() {
        assert!(has_capacity(None, 10_000));
        assert!(has_capacity(Some(2), 1));
        assert!(!has_capacity(Some(2), 2));
    }

    #[test]
    fn progress_bounds() {
        assert!(validate_progress(101).is_err());
        assert_eq!(validate_progress(40).unwrap(), 40);
    }

    #[test]
    fn cancelled_is_not_live() {
        assert!(!EnrollmentStatus::Cancelled.is_live());
        assert!(EnrollmentStatus::Completed.is_live());
    }
}
