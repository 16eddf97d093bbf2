//! External catalog imports

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportProvider {
    #[sea_orm(string_value = "UDEMY")]
    Udemy,
    #[sea_orm(string_value = "COURSERA")]
    Coursera,
    #[sea_orm(string_value = "PLURALSIGHT")]
    Pluralsight,
    #[sea_orm(string_value = "YOUTUBE")]
    Youtube,
}

impl ImportProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Udemy => "UDEMY",
            Self::Coursera => "COURSERA",
            Self::Pluralsight => "PLURALSIGHT",
            Self::Youtube => "YOUTUBE",
        }
    }
}

impl std::fmt::Display for ImportProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ImportProvider {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "UDEMY" => Ok(Self::Udemy),
            "COURSERA" => Ok(Self::Coursera),
            "PLURALSIGHT" => Ok(Self::Pluralsight),
            "YOUTUBE" => Ok(Self::Youtube),
            other => Err(DomainError::validation(format!("Unknown import provider: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "PROCESSING")]
    Processing,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "FAILED")]
    Failed,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl ImportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// PENDING -> PROCESSING -> COMPLETED | FAILED, cancel from either
    /// non-terminal state. Nothing reaches COMPLETED or FAILED without PROCESSING.
    pub fn can_transition_to(&self, next: ImportStatus) -> bool {
        use ImportStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Pending, Cancelled)
                | (Processing, Completed)
                | (Processing, Failed)
                | (Processing, Cancelled)
        )
    }

    pub fn ensure_transition(&self, next: ImportStatus) -> DomainResult<()> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(DomainError::Conflict(format!(
                "Import job cannot move from {} to {}",
                self, next
            )))
        }
    }
}

impl std::fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Course data fetched from a third-party catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalCourse {
    pub provider: ImportProvider,
    pub external_id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub thumbnail_url: Option<String>,
    pub lessons: Vec<ExternalLesson>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalLesson {
    pub title: String,
    pub content: Option<String>,
    pub video_url: Option<String>,
    pub duration_seconds: i32,
}

/// Parse an ISO-8601 duration such as `PT1H2M3S` (YouTube) into seconds.
pub fn parse_iso_duration(raw: &str) -> i32 {
    let Some(rest) = raw.strip_prefix("PT") else {
        return 0;
    };
    let mut total = 0i32;
    let mut num = String::new();
    for c in rest.chars() {
        if c.is_ascii_digit() {
            num.push(c);
            continue;
        }
        let value: i32 = num.parse().unwrap_or(0);
        num.clear();
        total += match c {
            'H' => value * 3600,
            'M' => value * 60,
            'S' => value,
            _ => 0,
        };
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_requires_processing() {
        assert!(!ImportStatus::Pending.can_transition_to(ImportStatus::Completed));
        assert!(ImportStatus::Pending.can_transition_to(ImportStatus::Processing));
        assert!(ImportStatus::Processing.can_transition_to(ImportStatus::Completed));
    }

    #[test]
    fn failure_requires_processing() {
        assert!(!ImportStatus::Pending.can_transition_to(ImportStatus::Failed));
        assert!(ImportStatus::Pending.ensure_transition(ImportStatus::Failed).is_err());
        assert!(ImportStatus::Processing.can_transition_to(ImportStatus::Failed));
        assert!(ImportStatus::Pending.can_transition_to(ImportStatus::Cancelled));
    }

    #[test]
    fn terminal_states_are_final() {
        for s in [ImportStatus::Completed, ImportStatus::Failed, ImportStatus::Cancelled] {
            assert!(s.is_terminal());
            assert!(s.ensure_transition(ImportStatus::Processing).is_err());
            assert!(!s.can_transition_to(ImportStatus::Cancelled));
        }
    }

    #[test]
    fn iso_durations() {
        assert_eq!(parse_iso_duration("PT1H2M3S"), 3723);
        assert_eq!(parse_iso_duration("PT15M"), 900);
        assert_eq!(parse_iso_duration("garbage"), 0);
    }
}
