//! Access policy: free, subscription and premium courses

use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use tracing::info;

use super::courses::course_cache_key;
use super::{load_course, load_owned_course, new_id, required};
use crate::domain::monetization::{
    evaluate_access, AccessDecision, AccessFacts, MonetizationType, SubscriptionStatus,
    SUBSCRIPTION_PERIOD_DAYS,
};
use crate::domain::payment::PaymentStatus;
use crate::domain::Actor;
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::database::entities::{bundle_course, course, payment, subscription};
use crate::shared::errors::{DomainError, DomainResult};

pub struct MonetizationService {
    db: DatabaseConnection,
    cache: Arc<CacheService>,
}

impl MonetizationService {
    pub fn new(db: DatabaseConnection, cache: Arc<CacheService>) -> Self {
        Self { db, cache }
    }

    pub async fn set_course_monetization(
        &self,
        actor: &Actor,
        course_id: &str,
        monetization: MonetizationType,
        price_cents: Option<i64>,
    ) -> DomainResult<course::Model> {
        let existing = load_owned_course(&self.db, actor, course_id).await?;
        let price = price_cents.unwrap_or(existing.price_cents);
        if price < 0 {
            return Err(DomainError::validation("Price cannot be negative"));
        }
        if monetization == MonetizationType::Premium && price == 0 {
            return Err(DomainError::validation("Premium courses need a price"));
        }
        let mut active: course::ActiveModel = existing.into();
        active.monetization_type = Set(monetization);
        active.price_cents = Set(price);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&self.db).await?;
        self.cache.delete(&course_cache_key(course_id));
        info!(course_id, monetization = %monetization, "Course monetization changed");
        Ok(updated)
    }

    /// Start a subscription, or extend the active one by another period.
    pub async fn subscribe(&self, user_id: &str, plan: &str) -> DomainResult<subscription::Model> {
        let plan = required("plan", plan)?;
        let now = Utc::now();
        let period = Duration::days(SUBSCRIPTION_PERIOD_DAYS);

        if let Some(current) = self.active_subscription(user_id).await? {
            let start = current.current_period_end.max(now);
            let mut active: subscription::ActiveModel = current.into();
            active.plan = Set(plan);
            active.current_period_end = Set(start + period);
            active.updated_at = Set(now);
            return Ok(active.update(&self.db).await?);
        }

        let created = subscription::ActiveModel {
            id: Set(new_id()),
            user_id: Set(user_id.to_string()),
            plan: Set(plan),
            status: Set(SubscriptionStatus::Active),
            current_period_start: Set(now),
            current_period_end: Set(now + period),
            cancelled_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;
        info!(user_id, subscription_id = %created.id, "Subscription started");
        Ok(created)
    }

    pub async fn cancel_subscription(&self, user_id: &str) -> DomainResult<subscription::Model> {
        let current = self
            .active_subscription(user_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "Subscription",
                field: "user_id",
                value: user_id.to_string(),
            })?;
        let now = Utc::now();
        let mut active: subscription::ActiveModel = current.into();
        active.status = Set(SubscriptionStatus::Cancelled);
        active.cancelled_at = Set(Some(now));
        active.updated_at = Set(now);
        Ok(active.update(&self.db).await?)
    }

    /// Newest ACTIVE subscription; lapsed ones are flipped to EXPIRED on read.
    pub async fn active_subscription(&self, user_id: &str) -> DomainResult<Option<subscription::Model>> {
        let found = subscription::Entity::find()
            .filter(subscription::Column::UserId.eq(user_id))
            .filter(subscription::Column::Status.eq(SubscriptionStatus::Active))
            .order_by_desc(subscription::Column::CurrentPeriodEnd)
            .one(&self.db)
            .await?;
        match found {
            Some(sub) if sub.current_period_end <= Utc::now() => {
                let mut active: subscription::ActiveModel = sub.into();
                active.status = Set(SubscriptionStatus::Expired);
                active.updated_at = Set(Utc::now());
                active.update(&self.db).await?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    pub async fn check_access(&self, actor: &Actor, course_id: &str) -> DomainResult<AccessDecision> {
        let course = load_course(&self.db, course_id).await?;
        self.check_course_access(actor, &course).await
    }

    pub async fn check_course_access(&self, actor: &Actor, course: &course::Model) -> DomainResult<AccessDecision> {
        let subscription_active_until = match course.monetization_type {
            MonetizationType::Subscription => self
                .active_subscription(&actor.user_id)
                .await?
                .map(|s| s.current_period_end),
            _ => None,
        };
        let has_purchase = match course.monetization_type {
            MonetizationType::Premium => has_course_purchase(&self.db, &actor.user_id, &course.id).await?,
            _ => false,
        };
        let facts = AccessFacts {
            monetization: course.monetization_type,
            is_course_teacher: course.teacher_id == actor.user_id,
            is_admin: actor.is_admin(),
            subscription_active_until,
            has_purchase,
        };
        Ok(evaluate_access(&facts, Utc::now()))
    }
}

/// COMPLETED payment for the course itself or a bundle containing it.
pub(crate) async fn has_course_purchase<C: ConnectionTrait>(db: &C, user_id: &str, course_id: &str) -> DomainResult<bool> {
    let direct = payment::Entity::find()
        .filter(payment::Column::UserId.eq(user_id))
        .filter(payment::Column::CourseId.eq(course_id))
        .filter(payment::Column::LessonId.is_null())
        .filter(payment::Column::Status.eq(PaymentStatus::Completed))
        .count(db)
        .await?;
    if direct > 0 {
        return Ok(true);
    }
    let bundle_ids: Vec<String> = bundle_course::Entity::find()
        .filter(bundle_course::Column::CourseId.eq(course_id))
        .all(db)
        .await?
        .into_iter()
        .map(|bc| bc.bundle_id)
        .collect();
    if bundle_ids.is_empty() {
        return Ok(false);
    }
    let via_bundle = payment::Entity::find()
        .filter(payment::Column::UserId.eq(user_id))
        .filter(payment::Column::BundleId.is_in(bundle_ids))
        .filter(payment::Column::Status.eq(PaymentStatus::Completed))
        .count(db)
        .await?;
    Ok(via_bundle > 0)
}
