//! Access policy for paid content

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MonetizationType {
    #[sea_orm(string_value = "FREE")]
    Free,
    #[sea_orm(string_value = "SUBSCRIPTION")]
    Subscription,
    #[sea_orm(string_value = "PREMIUM")]
    Premium,
}

impl MonetizationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "FREE",
            Self::Subscription => "SUBSCRIPTION",
            Self::Premium => "PREMIUM",
        }
    }
}

impl std::fmt::Display for MonetizationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MonetizationType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "FREE" => Ok(Self::Free),
            "SUBSCRIPTION" => Ok(Self::Subscription),
            "PREMIUM" => Ok(Self::Premium),
            other => Err(DomainError::validation(format!("Unknown monetization type: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
    #[sea_orm(string_value = "EXPIRED")]
    Expired,
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Active => "ACTIVE",
            Self::Cancelled => "CANCELLED",
            Self::Expired => "EXPIRED",
        })
    }
}

/// Length of one paid subscription period.
pub const SUBSCRIPTION_PERIOD_DAYS: i64 = 30;

/// Facts gathered about a user and a course before deciding access.
#[derive(Debug, Clone)]
pub struct AccessFacts {
    pub monetization: MonetizationType,
    pub is_course_teacher: bool,
    pub is_admin: bool,
    /// `current_period_end` of the user's newest ACTIVE subscription
    pub subscription_active_until: Option<DateTime<Utc>>,
    /// A COMPLETED payment for the course (direct or via a bundle)
    pub has_purchase: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    pub granted: bool,
    pub reason: String,
}

impl AccessDecision {
    fn grant(reason: &str) -> Self {
        Self {
            granted: true,
            reason: reason.to_string(),
        }
    }

    fn deny(reason: &str) -> Self {
        Self {
            granted: false,
            reason: reason.to_string(),
        }
    }
}

pub fn evaluate_access(facts: &AccessFacts, now: DateTime<Utc>) -> AccessDecision {
    if facts.is_admin {
        return AccessDecision::grant("admin");
    }
    if facts.is_course_teacher {
        return AccessDecision::grant("course teacher");
    }
    match facts.monetization {
        MonetizationType::Free => AccessDecision::grant("free course"),
        MonetizationType::Subscription => match facts.subscription_active_until {
            Some(end) if end > now => AccessDecision::grant("active subscription"),
            Some(_) => AccessDecision::deny("Subscription has expired"),
            None => AccessDecision::deny("An active subscription is required"),
        },
        MonetizationType::Premium => {
            if facts.has_purchase {
                AccessDecision::grant("purchased")
            } else {
                AccessDecision::deny("This premium course must be purchased first")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn facts(monetization: MonetizationType) -> AccessFacts {
        AccessFacts {
            monetization,
            is_course_teacher: false,
            is_admin: false,
            subscription_active_until: None,
            has_purchase: false,
        }
    }

    #[test]
    fn free_is_always_granted() {
        assert!(evaluate_access(&facts(MonetizationType::Free), Utc::now()).granted);
    }

    #[test]
    fn subscription_requires_unexpired_period() {
        let now = Utc::now();
        let mut f = facts(MonetizationType::Subscription);
        assert!(!evaluate_access(&f, now).granted);

        f.subscription_active_until = Some(now - Duration::days(1));
        let d = evaluate_access(&f, now);
        assert!(!d.granted);
        assert_eq!(d.reason, "Subscription has expired");

        f.subscription_active_until = Some(now + Duration::days(3));
        assert!(evaluate_access(&f, now).granted);
    }

    #[test]
    fn premium_requires_purchase_unless_teacher() {
        let mut f = facts(MonetizationType::Premium);
        assert!(!evaluate_access(&f, Utc::now()).granted);
        f.is_course_teacher = true;
        assert!(evaluate_access(&f, Utc::now()).granted);
        f.is_course_teacher = false;
        f.has_purchase = true;
        assert!(evaluate_access(&f, Utc::now()).granted);
    }
}
