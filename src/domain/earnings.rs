//! Teacher earnings: revenue shares and activity-gated payouts

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EarningSource {
    #[sea_orm(string_value = "ENROLLMENT")]
    Enrollment,
    #[sea_orm(string_value = "LESSON")]
    Lesson,
    #[sea_orm(string_value = "BUNDLE")]
    Bundle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EarningStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "PAID")]
    Paid,
    /// The payment was refunded before payout.
    #[sea_orm(string_value = "REVERSED")]
    Reversed,
}

impl std::fmt::Display for EarningSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Enrollment => "ENROLLMENT",
            Self::Lesson => "LESSON",
            Self::Bundle => "BUNDLE",
        })
    }
}

impl std::fmt::Display for EarningStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Reversed => "REVERSED",
        })
    }
}

/// Teacher share of `gross_cents`, rounded half-up to whole cents.
pub fn share_cents(gross_cents: i64, percent: u32) -> i64 {
    let pct = Decimal::from(percent.min(100));
    let share = Decimal::from(gross_cents.max(0)) * pct / Decimal::from(100);
    share
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

/// Half-open reporting window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<Self> {
        if end <= start {
            return Err(DomainError::validation("Period end must be after its start"));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }
}

/// One timestamped event produced by a student (lesson completion, quiz
/// submission, forum post, ...).
#[derive(Debug, Clone)]
pub struct ActivityEvent {
    pub student_id: String,
    pub at: DateTime<Utc>,
}

/// Distinct UTC dates with at least one event inside `period`, per student.
pub fn active_days(events: &[ActivityEvent], period: &Period) -> HashMap<String, usize> {
    let mut days: HashMap<&str, HashSet<NaiveDate>> = HashMap::new();
    for e in events.iter().filter(|e| period.contains(e.at)) {
        days.entry(e.student_id.as_str())
            .or_default()
            .insert(e.at.date_naive());
    }
    days.into_iter()
        .map(|(student, set)| (student.to_string(), set.len()))
        .collect()
}

/// An earning line attributed to the student whose purchase produced it.
#[derive(Debug, Clone)]
pub struct EarningLine {
    pub earning_id: String,
    pub student_id: Option<String>,
    pub share_cents: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Payout {
    pub payable_cents: i64,
    pub withheld_cents: i64,
    pub payable_ids: Vec<String>,
    pub withheld_ids: Vec<String>,
    pub active_students: usize,
    pub inactive_students: usize,
}

/// Split earnings into payable and withheld by student activity.
///
/// Lines without an attributable student are always payable.
pub fn calculate_payout(
    lines: &[EarningLine],
    active: &HashMap<String, usize>,
    min_active_days: u32,
) -> Payout {
    let mut payout = Payout::default();
    let mut counted: HashSet<&str> = HashSet::new();

    for line in lines {
        let qualifies = match &line.student_id {
            Some(s) => {
                let ok = active.get(s).copied().unwrap_or(0) >= min_active_days as usize;
                if counted.insert(s.as_str()) {
                    if ok {
                        payout.active_students += 1;
                    } else {
                        payout.inactive_students += 1;
                    }
                }
                ok
            }
            None => true,
        };
        if qualifies {
            payout.payable_cents += line.share_cents;
            payout.payable_ids.push(line.earning_id.clone());
        } else {
            payout.withheld_cents += line.share_cents;
            payout.withheld_ids.push(line.earning_id.clone());
        }
    }
    payout
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn ev(s: &str, t: DateTime<Utc>) -> ActivityEvent {
        ActivityEvent {
            student_id: s.into(),
            at: t,
        }
    }

    #[test]
    fn share_rounds_half_up() {
        assert_eq!(share_cents(10_000, 70), 7_000);
        assert_eq!(share_cents(999, 50), 500);
        assert_eq!(share_cents(-5, 70), 0);
        assert_eq!(share_cents(100, 150), 100);
    }

    #[test]
    fn same_day_counts_once() {
        let period = Period::new(at(1, 0), at(31, 0)).unwrap();
        let events = vec![ev("a", at(2, 1)), ev("a", at(2, 23)), ev("a", at(3, 5)), ev("b", at(4, 4))];
        let days = active_days(&events, &period);
        assert_eq!(days["a"], 2);
        assert_eq!(days["b"], 1);
    }

    #[test]
    fn events_outside_period_ignored() {
        let period = Period::new(at(10, 0), at(11, 0)).unwrap();
        let events = vec![ev("a", at(9, 23)), ev("a", at(11, 0)), ev("a", at(10, 12))];
        assert_eq!(active_days(&events, &period)["a"], 1);
    }

    #[test]
    fn inactive_students_are_withheld() {
        let mut active = HashMap::new();
        active.insert("a".to_string(), 5);
        active.insert("b".to_string(), 1);
        let lines = vec![
            EarningLine { earning_id: "e1".into(), student_id: Some("a".into()), share_cents: 700 },
            EarningLine { earning_id: "e2".into(), student_id: Some("b".into()), share_cents: 300 },
            EarningLine { earning_id: "e3".into(), student_id: Some("c".into()), share_cents: 100 },
            EarningLine { earning_id: "e4".into(), student_id: None, share_cents: 50 },
        ];
        let p = calculate_payout(&lines, &active, 3);
        assert_eq!(p.payable_cents, 750);
        assert_eq!(p.withheld_cents, 400);
        assert_eq!(p.active_students, 1);
        assert_eq!(p.inactive_students, 2);
        assert_eq!(p.withheld_ids, vec!["e2".to_string(), "e3".to_string()]);
    }

    #[test]
    fn empty_period_rejected() {
        let t = Utc::now();
        assert!(Period::new(t, t).is_err());
        assert!(Period::new(t, t + Duration::days(1)).is_ok());
    }
}
