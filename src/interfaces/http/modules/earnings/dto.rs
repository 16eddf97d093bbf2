use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::earnings::Period;
use crate::shared::errors::DomainResult;

/// `?start=&end=`; defaults to the current calendar month.
#[derive(Debug, Deserialize, IntoParams)]
pub struct PeriodParams {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl PeriodParams {
    pub fn resolve(&self, now: DateTime<Utc>) -> DomainResult<Period> {
        let month_start = Utc
            .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
            .single()
            .unwrap_or(now);
        let start = self.start.unwrap_or(month_start);
        let end = self.end.unwrap_or(now);
        Period::new(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn defaults_to_month_to_date() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        let period = PeriodParams { start: None, end: None }.resolve(now).unwrap();
        assert_eq!(period.start, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(period.end, now);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let now = Utc::now();
        let params = PeriodParams {
            start: Some(now),
            end: Some(now - Duration::days(1)),
        };
        assert!(params.resolve(now).is_err());
    }
}
