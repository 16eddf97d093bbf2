use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::services::calendar::{EventChanges, NewEvent};
use crate::domain::calendar::EventKind;
use crate::interfaces::http::common::{parse_enum, ApiError};

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateEventRequest {
    pub course_id: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    /// LIVE_SESSION, DEADLINE, PERSONAL or OFFICE_HOURS (default PERSONAL)
    pub kind: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    #[validate(url)]
    pub meeting_url: Option<String>,
}

impl CreateEventRequest {
    pub fn into_new_event(self) -> Result<NewEvent, ApiError> {
        let kind = match self.kind.as_deref() {
            Some(raw) => parse_enum::<EventKind>(raw)?,
            None => EventKind::Personal,
        };
        Ok(NewEvent {
            course_id: self.course_id,
            title: self.title,
            description: self.description,
            kind,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            location: self.location,
            meeting_url: self.meeting_url,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    #[validate(url)]
    pub meeting_url: Option<String>,
}

impl From<UpdateEventRequest> for EventChanges {
    fn from(r: UpdateEventRequest) -> Self {
        Self {
            title: r.title,
            description: r.description,
            starts_at: r.starts_at,
            ends_at: r.ends_at,
            location: r.location,
            meeting_url: r.meeting_url,
        }
    }
}

/// Range query; defaults to the next 30 days.
#[derive(Debug, Deserialize, IntoParams)]
pub struct RangeParams {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl RangeParams {
    pub fn resolve(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let from = self.from.unwrap_or(now);
        let to = self.to.unwrap_or(from + Duration::days(30));
        (from, to)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UpcomingParams {
    #[serde(default = "default_upcoming")]
    pub limit: u64,
}

fn default_upcoming() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_range_defaults_to_thirty_days() {
        let now = Utc::now();
        let (from, to) = RangeParams { from: None, to: None }.resolve(now);
        assert_eq!(from, now);
        assert_eq!(to - from, Duration::days(30));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let req = CreateEventRequest {
            course_id: None,
            title: "Office hours".into(),
            description: None,
            kind: Some("PARTY".into()),
            starts_at: Utc::now(),
            ends_at: Utc::now() + Duration::hours(1),
            location: None,
            meeting_url: None,
        };
        assert!(req.into_new_event().is_err());
    }
}
