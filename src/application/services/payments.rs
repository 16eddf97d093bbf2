//! Payment records
//!
//! Capture happens at an external provider; this service only tracks state
//! and applies the consequences of a completed payment.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{info, warn};

use super::teacher_earnings::{reverse_for_payment, TeacherEarningsService};
use super::{coupons, load_course, new_id};
use crate::domain::coupon::DiscountQuote;
use crate::domain::payment::{PaymentStatus, PurchaseTarget};
use crate::domain::Actor;
use crate::infrastructure::database::entities::{bundle, payment};
use crate::shared::best_effort;
use crate::shared::errors::{DomainError, DomainResult};

pub struct PaymentService {
    db: DatabaseConnection,
    earnings: Arc<TeacherEarningsService>,
}

impl PaymentService {
    pub fn new(db: DatabaseConnection, earnings: Arc<TeacherEarningsService>) -> Self {
        Self { db, earnings }
    }

    /// Open a PENDING payment for a course or bundle, quoting the coupon if one is given.
    pub async fn create(
        &self,
        actor: &Actor,
        target: PurchaseTarget,
        coupon_code: Option<&str>,
    ) -> DomainResult<payment::Model> {
        let (amount, currency) = match &target {
            PurchaseTarget::Course(course_id) => {
                let course = load_course(&self.db, course_id).await?;
                (course.price_cents, course.currency)
            }
            PurchaseTarget::Bundle(bundle_id) => {
                let found = bundle::Entity::find_by_id(bundle_id.clone())
                    .one(&self.db)
                    .await?
                    .ok_or_else(|| DomainError::not_found("Bundle", bundle_id.as_str()))?;
                if !found.is_active {
                    return Err(DomainError::validation("Bundle is not available"));
                }
                let pricing = super::bundles::pricing(&self.db, &found).await?;
                (pricing.price_cents, "USD".to_string())
            }
            PurchaseTarget::Lesson { lesson_id, .. } => {
                let lesson = super::load_lesson(&self.db, lesson_id).await?;
                (lesson.price_cents, "USD".to_string())
            }
        };
        if amount <= 0 {
            return Err(DomainError::validation("Nothing to pay for"));
        }
        let quote = match coupon_code {
            Some(code) => coupons::quote(&self.db, code, target.course_id(), amount).await?,
            None => DiscountQuote::none(amount),
        };
        let created = insert_payment(&self.db, &actor.user_id, &target, &quote, &currency, coupon_code).await?;
        info!(payment_id = %created.id, user_id = %actor.user_id, final_cents = created.final_cents, "Payment created");
        Ok(created)
    }

    pub async fn get(&self, actor: &Actor, payment_id: &str) -> DomainResult<payment::Model> {
        let found = load_payment(&self.db, payment_id).await?;
        actor.ensure_owns(&found.user_id, "payment")?;
        Ok(found)
    }

    /// Mark captured. Completing an already COMPLETED payment is a no-op.
    pub async fn complete(&self, actor: &Actor, payment_id: &str, provider_ref: Option<String>) -> DomainResult<payment::Model> {
        let existing = load_payment(&self.db, payment_id).await?;
        actor.ensure_owns(&existing.user_id, "payment")?;
        if existing.status == PaymentStatus::Completed {
            return Ok(existing);
        }

        let txn = self.db.begin().await?;
        let completed = complete_in(&txn, existing, provider_ref).await?;
        txn.commit().await?;

        best_effort("record_earning", self.earnings.record_for_payment(&completed)).await;
        info!(payment_id, "Payment completed");
        Ok(completed)
    }

    pub async fn fail(&self, actor: &Actor, payment_id: &str) -> DomainResult<payment::Model> {
        self.transition(actor, payment_id, PaymentStatus::Failed).await
    }

    /// Only admins refund. The teacher earnings the payment produced are
    /// reversed in the same transaction, so they never reach a payout.
    pub async fn refund(&self, actor: &Actor, payment_id: &str) -> DomainResult<payment::Model> {
        actor.ensure_admin()?;
        let existing = load_payment(&self.db, payment_id).await?;
        existing.status.ensure_transition(PaymentStatus::Refunded)?;

        let txn = self.db.begin().await?;
        let mut active: payment::ActiveModel = existing.into();
        active.status = Set(PaymentStatus::Refunded);
        active.updated_at = Set(Utc::now());
        let refunded = active.update(&txn).await?;
        let (reversed, already_paid) = reverse_for_payment(&txn, payment_id).await?;
        txn.commit().await?;

        if already_paid > 0 {
            warn!(payment_id, already_paid, "Refunded payment had earnings already paid out");
        }
        info!(payment_id, reversed, "Payment refunded");
        Ok(refunded)
    }

    pub async fn list_for_user(&self, user_id: &str) -> DomainResult<Vec<payment::Model>> {
        Ok(payment::Entity::find()
            .filter(payment::Column::UserId.eq(user_id))
            .order_by_desc(payment::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn transition(&self, actor: &Actor, payment_id: &str, next: PaymentStatus) -> DomainResult<payment::Model> {
        let existing = load_payment(&self.db, payment_id).await?;
        actor.ensure_owns(&existing.user_id, "payment")?;
        existing.status.ensure_transition(next)?;
        let mut active: payment::ActiveModel = existing.into();
        active.status = Set(next);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&self.db).await?;
        info!(payment_id, status = %next, "Payment status changed");
        Ok(updated)
    }
}

pub(crate) async fn load_payment<C: ConnectionTrait>(db: &C, payment_id: &str) -> DomainResult<payment::Model> {
    payment::Entity::find_by_id(payment_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Payment", payment_id))
}

pub(crate) async fn insert_payment<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    target: &PurchaseTarget,
    quote: &DiscountQuote,
    currency: &str,
    coupon_code: Option<&str>,
) -> DomainResult<payment::Model> {
    let (course_id, bundle_id, lesson_id) = match target {
        PurchaseTarget::Course(id) => (Some(id.clone()), None, None),
        PurchaseTarget::Bundle(id) => (None, Some(id.clone()), None),
        PurchaseTarget::Lesson { lesson_id, course_id } => (Some(course_id.clone()), None, Some(lesson_id.clone())),
    };
    let now = Utc::now();
    Ok(payment::ActiveModel {
        id: Set(new_id()),
        user_id: Set(user_id.to_string()),
        course_id: Set(course_id),
        bundle_id: Set(bundle_id),
        lesson_id: Set(lesson_id),
        amount_cents: Set(quote.amount_cents),
        discount_cents: Set(quote.discount_cents),
        final_cents: Set(quote.final_cents),
        currency: Set(currency.to_string()),
        coupon_code: Set(coupon_code.map(crate::domain::coupon::normalize_code)),
        status: Set(PaymentStatus::Pending),
        provider_ref: Set(None),
        created_at: Set(now),
        completed_at: Set(None),
        updated_at: Set(now),
    }
    .insert(db)
    .await?)
}

/// PENDING -> COMPLETED, consuming the coupon use when one was quoted.
pub(crate) async fn complete_in<C: ConnectionTrait>(
    db: &C,
    existing: payment::Model,
    provider_ref: Option<String>,
) -> DomainResult<payment::Model> {
    existing.status.ensure_transition(PaymentStatus::Completed)?;
    if let Some(code) = existing.coupon_code.as_deref() {
        coupons::redeem(
            db,
            code,
            &existing.user_id,
            existing.course_id.as_deref(),
            existing.amount_cents,
            Some(&existing.id),
        )
        .await?;
    }
    let now = Utc::now();
    let mut active: payment::ActiveModel = existing.into();
    active.status = Set(PaymentStatus::Completed);
    active.provider_ref = Set(provider_ref);
    active.completed_at = Set(Some(now));
    active.updated_at = Set(now);
    Ok(active.update(db).await?)
}
