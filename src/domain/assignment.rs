use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    #[sea_orm(string_value = "SUBMITTED")]
    Submitted,
    #[sea_orm(string_value = "GRADED")]
    Graded,
    #[sea_orm(string_value = "RETURNED")]
    Returned,
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Submitted => "SUBMITTED",
            Self::Graded => "GRADED",
            Self::Returned => "RETURNED",
        })
    }
}

impl SubmissionStatus {
    /// Students may resubmit until a grade is recorded.
    pub fn accepts_resubmission(&self) -> bool {
        !matches!(self, Self::Graded)
    }
}

pub fn is_late(due_at: Option<DateTime<Utc>>, submitted_at: DateTime<Utc>) -> bool {
    due_at.is_some_and(|due| submitted_at > due)
}

pub fn validate_grade(points: i32, max_points: i32) -> DomainResult<()> {
    if (0..=max_points).contains(&points) {
        Ok(())
    } else {
        Err(DomainError::validation(format!(
            "Points must be between 0 and {}",
            max_points
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn late_only_after_due() {
        let now = Utc::now();
        assert!(is_late(Some(now - Duration::hours(1)), now));
        assert!(!is_late(Some(now + Duration::hours(1)), now));
        assert!(!is_late(None, now));
    }

    #[test]
    fn grade_bounds() {
        assert!(validate_grade(0, 10).is_ok());
        assert!(validate_grade(10, 10).is_ok());
        assert!(validate_grade(11, 10).is_err());
        assert!(validate_grade(-1, 10).is_err());
    }

    #[test]
    fn graded_is_final() {
        assert!(SubmissionStatus::Returned.accepts_resubmission());
        assert!(!SubmissionStatus::Graded.accepts_resubmission());
    }
}
