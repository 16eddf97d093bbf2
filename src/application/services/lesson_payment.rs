//! Buying single lessons out of a paid course

use std::sync::Arc;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, TransactionTrait};
use serde::Serialize;
use tracing::info;

use super::coupons::CouponService;
use super::email::{lesson_purchase_receipt, EmailService};
use super::monetization::MonetizationService;
use super::payments::{complete_in, insert_payment};
use super::teacher_earnings::TeacherEarningsService;
use super::{load_course, load_lesson, load_user};
use crate::domain::coupon::DiscountQuote;
use crate::domain::monetization::AccessDecision;
use crate::domain::payment::{PaymentStatus, PurchaseTarget};
use crate::domain::Actor;
use crate::infrastructure::database::entities::payment;
use crate::shared::best_effort;
use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Serialize)]
pub struct LessonAccess {
    pub lesson_id: String,
    #[serde(flatten)]
    pub decision: AccessDecision,
}

pub struct LessonPaymentService {
    db: DatabaseConnection,
    coupons: Arc<CouponService>,
    monetization: Arc<MonetizationService>,
    earnings: Arc<TeacherEarningsService>,
    email: Arc<EmailService>,
}

impl LessonPaymentService {
    pub fn new(
        db: DatabaseConnection,
        coupons: Arc<CouponService>,
        monetization: Arc<MonetizationService>,
        earnings: Arc<TeacherEarningsService>,
        email: Arc<EmailService>,
    ) -> Self {
        Self {
            db,
            coupons,
            monetization,
            earnings,
            email,
        }
    }

    /// Create and capture a payment for one lesson.
    pub async fn purchase_lesson(&self, actor: &Actor, lesson_id: &str, coupon_code: Option<&str>) -> DomainResult<payment::Model> {
        let lesson = load_lesson(&self.db, lesson_id).await?;
        if lesson.price_cents <= 0 {
            return Err(DomainError::validation("Lesson is not sold separately"));
        }
        if self.has_purchased(&actor.user_id, lesson_id).await? {
            return Err(DomainError::Conflict("Lesson already purchased".into()));
        }
        let course = load_course(&self.db, &lesson.course_id).await?;
        let quote = match coupon_code {
            Some(code) => self.coupons.validate(code, Some(&course.id), lesson.price_cents).await?,
            None => DiscountQuote::none(lesson.price_cents),
        };
        let target = PurchaseTarget::Lesson {
            lesson_id: lesson.id.clone(),
            course_id: course.id.clone(),
        };

        let txn = self.db.begin().await?;
        let pending = insert_payment(&txn, &actor.user_id, &target, &quote, &course.currency, coupon_code).await?;
        let paid = complete_in(&txn, pending, None).await?;
        txn.commit().await?;
        info!(payment_id = %paid.id, lesson_id, final_cents = paid.final_cents, "Lesson purchased");

        best_effort("lesson_earning", self.earnings.record_for_payment(&paid)).await;
        if let Some(buyer) = best_effort("load_buyer", load_user(&self.db, &actor.user_id)).await {
            best_effort(
                "lesson_receipt",
                self.email.send(lesson_purchase_receipt(
                    &buyer.email,
                    &buyer.username,
                    &lesson.title,
                    paid.final_cents,
                    &paid.currency,
                )),
            )
            .await;
        }
        Ok(paid)
    }

    /// Preview lessons are open; otherwise course access or a lesson purchase.
    pub async fn has_access(&self, actor: &Actor, lesson_id: &str) -> DomainResult<LessonAccess> {
        let lesson = load_lesson(&self.db, lesson_id).await?;
        let decision = if lesson.is_preview {
            AccessDecision {
                granted: true,
                reason: "preview lesson".into(),
            }
        } else {
            let course = load_course(&self.db, &lesson.course_id).await?;
            let course_access = self.monetization.check_course_access(actor, &course).await?;
            if course_access.granted {
                course_access
            } else if self.has_purchased(&actor.user_id, lesson_id).await? {
                AccessDecision {
                    granted: true,
                    reason: "lesson purchased".into(),
                }
            } else {
                course_access
            }
        };
        Ok(LessonAccess {
            lesson_id: lesson.id,
            decision,
        })
    }

    async fn has_purchased(&self, user_id: &str, lesson_id: &str) -> DomainResult<bool> {
        let n = payment::Entity::find()
            .filter(payment::Column::UserId.eq(user_id))
            .filter(payment::Column::LessonId.eq(lesson_id))
            .filter(payment::Column::Status.eq(PaymentStatus::Completed))
            .count(&self.db)
            .await?;
        Ok(n > 0)
    }
}
