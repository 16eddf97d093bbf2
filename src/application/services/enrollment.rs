//! Enrollments

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;

use super::email::{enrollment_confirmation, EmailService};
use super::monetization::MonetizationService;
use super::prerequisites::check_prerequisites;
use super::referral::ReferralService;
use super::waitlist::{live_enrollments, mark_enrolled, WaitlistService};
use super::{load_course, load_owned_course, load_user, new_id};
use crate::domain::course::CourseStatus;
use crate::domain::enrollment::{has_capacity, validate_progress, EnrollmentStatus};
use crate::domain::Actor;
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::database::entities::{course, enrollment};
use crate::shared::best_effort;
use crate::shared::errors::{DomainError, DomainResult};

pub struct EnrollmentService {
    db: DatabaseConnection,
    cache: Arc<CacheService>,
    monetization: Arc<MonetizationService>,
    referral: Arc<ReferralService>,
    waitlist: Arc<WaitlistService>,
    email: Arc<EmailService>,
}

impl EnrollmentService {
    pub fn new(
        db: DatabaseConnection,
        cache: Arc<CacheService>,
        monetization: Arc<MonetizationService>,
        referral: Arc<ReferralService>,
        waitlist: Arc<WaitlistService>,
        email: Arc<EmailService>,
    ) -> Self {
        Self {
            db,
            cache,
            monetization,
            referral,
            waitlist,
            email,
        }
    }

    /// Enroll the acting user. A CANCELLED enrollment is re-activated.
    pub async fn enroll(&self, actor: &Actor, course_id: &str) -> DomainResult<enrollment::Model> {
        let course = load_course(&self.db, course_id).await?;
        ensure_open(&course)?;

        let existing = find_enrollment(&self.db, &actor.user_id, course_id).await?;
        if existing.as_ref().is_some_and(|e| e.status.is_live()) {
            return Err(DomainError::Conflict("Already enrolled in this course".into()));
        }

        let access = self.monetization.check_course_access(actor, &course).await?;
        if !access.granted {
            return Err(DomainError::forbidden(access.reason));
        }

        ensure_eligible(&self.db, &actor.user_id, &course).await?;

        let enrolled = activate(&self.db, &actor.user_id, course_id, existing, None).await?;
        info!(course_id, student_id = %actor.user_id, enrollment_id = %enrolled.id, "Student enrolled");

        self.after_enrollment(&course, &enrolled).await;
        Ok(enrolled)
    }

    async fn after_enrollment(&self, course: &course::Model, enrolled: &enrollment::Model) {
        best_effort("referral_conversion", self.referral.convert_on_enrollment(&enrolled.student_id)).await;
        best_effort("waitlist_close", mark_enrolled(&self.db, &enrolled.student_id, &course.id)).await;
        if let Some(student) = best_effort("load_student", load_user(&self.db, &enrolled.student_id)).await {
            best_effort(
                "enrollment_email",
                self.email
                    .send(enrollment_confirmation(&student.email, &student.username, &course.title)),
            )
            .await;
        }
        self.invalidate_dashboards(&enrolled.student_id, &course.teacher_id);
    }

    pub async fn get(&self, actor: &Actor, enrollment_id: &str) -> DomainResult<enrollment::Model> {
        let found = load_enrollment(&self.db, enrollment_id).await?;
        if !actor.owns(&found.student_id) {
            load_owned_course(&self.db, actor, &found.course_id).await?;
        }
        Ok(found)
    }

    pub async fn list_for_student(&self, student_id: &str) -> DomainResult<Vec<enrollment::Model>> {
        Ok(enrollment::Entity::find()
            .filter(enrollment::Column::StudentId.eq(student_id))
            .order_by_desc(enrollment::Column::EnrolledAt)
            .all(&self.db)
            .await?)
    }

    pub async fn list_for_course(&self, actor: &Actor, course_id: &str) -> DomainResult<Vec<enrollment::Model>> {
        load_owned_course(&self.db, actor, course_id).await?;
        Ok(enrollment::Entity::find()
            .filter(enrollment::Column::CourseId.eq(course_id))
            .order_by_asc(enrollment::Column::EnrolledAt)
            .all(&self.db)
            .await?)
    }

    /// Cancelling frees a seat, which is offered to the waitlist.
    pub async fn cancel(&self, actor: &Actor, enrollment_id: &str) -> DomainResult<enrollment::Model> {
        let existing = load_enrollment(&self.db, enrollment_id).await?;
        actor.ensure_owns(&existing.student_id, "enrollment")?;
        if existing.status == EnrollmentStatus::Cancelled {
            return Ok(existing);
        }
        let now = Utc::now();
        let mut active: enrollment::ActiveModel = existing.into();
        active.status = Set(EnrollmentStatus::Cancelled);
        active.cancelled_at = Set(Some(now));
        active.updated_at = Set(now);
        let cancelled = active.update(&self.db).await?;
        info!(enrollment_id, course_id = %cancelled.course_id, "Enrollment cancelled");

        best_effort("waitlist_notify", self.waitlist.notify_next(&cancelled.course_id)).await;
        if let Some(course) = best_effort("load_course", load_course(&self.db, &cancelled.course_id)).await {
            self.invalidate_dashboards(&cancelled.student_id, &course.teacher_id);
        }
        Ok(cancelled)
    }

    pub async fn complete(&self, actor: &Actor, enrollment_id: &str) -> DomainResult<enrollment::Model> {
        let existing = self.get(actor, enrollment_id).await?;
        let completed = set_progress(&self.db, existing, 100).await?;
        self.cache.delete_pattern(&format!("dashboard:*:{}", completed.student_id));
        Ok(completed)
    }

    /// Reaching 100 completes the enrollment.
    pub async fn update_progress(&self, actor: &Actor, enrollment_id: &str, percent: i32) -> DomainResult<enrollment::Model> {
        let percent = validate_progress(percent)?;
        let existing = self.get(actor, enrollment_id).await?;
        let updated = set_progress(&self.db, existing, percent).await?;
        self.cache.delete_pattern(&format!("dashboard:*:{}", updated.student_id));
        Ok(updated)
    }

    fn invalidate_dashboards(&self, student_id: &str, teacher_id: &str) {
        self.cache.delete_pattern(&format!("dashboard:*:{}", student_id));
        self.cache.delete_pattern(&format!("dashboard:*:{}", teacher_id));
    }
}

pub(crate) fn ensure_open(course: &course::Model) -> DomainResult<()> {
    if course.status != CourseStatus::Published {
        return Err(DomainError::validation(format!(
            "Course '{}' is not open for enrollment",
            course.title
        )));
    }
    Ok(())
}

/// Prerequisites met and a seat free. Shared by direct enrollment and bundle purchase.
pub(crate) async fn ensure_eligible<C: ConnectionTrait>(
    db: &C,
    student_id: &str,
    course: &course::Model,
) -> DomainResult<()> {
    let prereqs = check_prerequisites(db, student_id, &course.id).await?;
    if !prereqs.satisfied {
        return Err(DomainError::forbidden(format!(
            "Missing prerequisites: {}",
            prereqs.missing.join(", ")
        )));
    }
    let live = live_enrollments(db, &course.id).await?;
    if !has_capacity(course.capacity, live) {
        return Err(DomainError::Conflict(format!("Course '{}' is full", course.title)));
    }
    Ok(())
}

pub(crate) async fn load_enrollment<C: ConnectionTrait>(db: &C, enrollment_id: &str) -> DomainResult<enrollment::Model> {
    enrollment::Entity::find_by_id(enrollment_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Enrollment", enrollment_id))
}

pub(crate) async fn find_enrollment<C: ConnectionTrait>(
    db: &C,
    student_id: &str,
    course_id: &str,
) -> DomainResult<Option<enrollment::Model>> {
    Ok(enrollment::Entity::find()
        .filter(enrollment::Column::StudentId.eq(student_id))
        .filter(enrollment::Column::CourseId.eq(course_id))
        .one(db)
        .await?)
}

/// Insert an ACTIVE enrollment, or re-activate `existing`.
pub(crate) async fn activate<C: ConnectionTrait>(
    db: &C,
    student_id: &str,
    course_id: &str,
    existing: Option<enrollment::Model>,
    payment_id: Option<String>,
) -> DomainResult<enrollment::Model> {
    let now = Utc::now();
    match existing {
        Some(previous) => {
            let mut active: enrollment::ActiveModel = previous.into();
            active.status = Set(EnrollmentStatus::Active);
            active.progress_percent = Set(0);
            active.cancelled_at = Set(None);
            active.completed_at = Set(None);
            active.enrolled_at = Set(now);
            active.updated_at = Set(now);
            if payment_id.is_some() {
                active.payment_id = Set(payment_id);
            }
            Ok(active.update(db).await?)
        }
        None => Ok(enrollment::ActiveModel {
            id: Set(new_id()),
            student_id: Set(student_id.to_string()),
            course_id: Set(course_id.to_string()),
            status: Set(EnrollmentStatus::Active),
            progress_percent: Set(0),
            payment_id: Set(payment_id),
            enrolled_at: Set(now),
            completed_at: Set(None),
            cancelled_at: Set(None),
            updated_at: Set(now),
        }
        .insert(db)
        .await?),
    }
}

pub(crate) async fn set_progress<C: ConnectionTrait>(
    db: &C,
    existing: enrollment::Model,
    percent: i32,
) -> DomainResult<enrollment::Model> {
    if existing.status == EnrollmentStatus::Cancelled {
        return Err(DomainError::validation("Enrollment is cancelled"));
    }
    let now = Utc::now();
    let completes = percent >= 100 && existing.status != EnrollmentStatus::Completed;
    let mut active: enrollment::ActiveModel = existing.into();
    active.progress_percent = Set(percent);
    if completes {
        active.status = Set(EnrollmentStatus::Completed);
        active.completed_at = Set(Some(now));
    }
    active.updated_at = Set(now);
    let updated = active.update(db).await?;
    if completes {
        info!(enrollment_id = %updated.id, course_id = %updated.course_id, "Enrollment completed");
    }
    Ok(updated)
}
