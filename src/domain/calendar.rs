use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    #[sea_orm(string_value = "LIVE_SESSION")]
    LiveSession,
    #[sea_orm(string_value = "DEADLINE")]
    Deadline,
    #[sea_orm(string_value = "PERSONAL")]
    Personal,
    #[sea_orm(string_value = "OFFICE_HOURS")]
    OfficeHours,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::LiveSession => "LIVE_SESSION",
            Self::Deadline => "DEADLINE",
            Self::Personal => "PERSONAL",
            Self::OfficeHours => "OFFICE_HOURS",
        })
    }
}

impl std::str::FromStr for EventKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LIVE_SESSION" => Ok(Self::LiveSession),
            "DEADLINE" => Ok(Self::Deadline),
            "PERSONAL" => Ok(Self::Personal),
            "OFFICE_HOURS" => Ok(Self::OfficeHours),
            other => Err(DomainError::validation(format!("Unknown event kind: {}", other))),
        }
    }
}

pub fn validate_range(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> DomainResult<()> {
    if ends_at > starts_at {
        Ok(())
    } else {
        Err(DomainError::validation("Event must end after it starts"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn range_must_be_positive() {
        let now = Utc::now();
        assert!(validate_range(now, now + Duration::minutes(30)).is_ok());
        assert!(validate_range(now, now).is_err());
    }

    #[test]
    fn kind_parse() {
        assert_eq!("office_hours".parse::<EventKind>().unwrap(), EventKind::OfficeHours);
    }
}
