//! Waitlists for full courses

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use tracing::info;

use super::email::{waitlist_seat_available, EmailService};
use super::{is_enrolled, load_course, load_owned_course, load_user, new_id};
use crate::domain::enrollment::{has_capacity, EnrollmentStatus};
use crate::domain::waitlist::WaitlistStatus;
use crate::domain::Actor;
use crate::infrastructure::database::entities::{enrollment, waitlist_entry};
use crate::shared::best_effort;
use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Serialize)]
pub struct WaitlistPosition {
    pub entry: waitlist_entry::Model,
    /// 1-based place among users still waiting
    pub place: u64,
}

pub struct WaitlistService {
    db: DatabaseConnection,
    email: Arc<EmailService>,
}

impl WaitlistService {
    pub fn new(db: DatabaseConnection, email: Arc<EmailService>) -> Self {
        Self { db, email }
    }

    pub async fn join(&self, actor: &Actor, course_id: &str) -> DomainResult<waitlist_entry::Model> {
        let course = load_course(&self.db, course_id).await?;
        if is_enrolled(&self.db, &actor.user_id, course_id).await? {
            return Err(DomainError::Conflict("Already enrolled in this course".into()));
        }
        let live = live_enrollments(&self.db, course_id).await?;
        if has_capacity(course.capacity, live) {
            return Err(DomainError::validation("Course has open seats; enroll directly"));
        }
        if queued_entry(&self.db, &actor.user_id, course_id).await?.is_some() {
            return Err(DomainError::Conflict("Already on the waitlist".into()));
        }

        let last = waitlist_entry::Entity::find()
            .filter(waitlist_entry::Column::CourseId.eq(course_id))
            .order_by_desc(waitlist_entry::Column::Position)
            .one(&self.db)
            .await?;
        let created = waitlist_entry::ActiveModel {
            id: Set(new_id()),
            course_id: Set(course_id.to_string()),
            user_id: Set(actor.user_id.clone()),
            position: Set(last.map(|e| e.position).unwrap_or(0) + 1),
            status: Set(WaitlistStatus::Waiting),
            notified_at: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?;
        info!(course_id, user_id = %actor.user_id, position = created.position, "Joined waitlist");
        Ok(created)
    }

    pub async fn leave(&self, actor: &Actor, course_id: &str) -> DomainResult<()> {
        let entry = queued_entry(&self.db, &actor.user_id, course_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Waitlist entry", course_id))?;
        let mut active: waitlist_entry::ActiveModel = entry.into();
        active.status = Set(WaitlistStatus::Left);
        active.update(&self.db).await?;
        Ok(())
    }

    pub async fn position(&self, actor: &Actor, course_id: &str) -> DomainResult<WaitlistPosition> {
        let entry = queued_entry(&self.db, &actor.user_id, course_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Waitlist entry", course_id))?;
        let ahead = waitlist_entry::Entity::find()
            .filter(waitlist_entry::Column::CourseId.eq(course_id))
            .filter(waitlist_entry::Column::Status.eq(WaitlistStatus::Waiting))
            .filter(waitlist_entry::Column::Position.lt(entry.position))
            .count(&self.db)
            .await?;
        Ok(WaitlistPosition { entry, place: ahead + 1 })
    }

    pub async fn list(&self, actor: &Actor, course_id: &str) -> DomainResult<Vec<waitlist_entry::Model>> {
        load_owned_course(&self.db, actor, course_id).await?;
        Ok(waitlist_entry::Entity::find()
            .filter(waitlist_entry::Column::CourseId.eq(course_id))
            .order_by_asc(waitlist_entry::Column::Position)
            .all(&self.db)
            .await?)
    }

    /// Offer the freed seat to the longest-waiting user.
    pub async fn notify_next(&self, course_id: &str) -> DomainResult<Option<waitlist_entry::Model>> {
        let course = load_course(&self.db, course_id).await?;
        let next = waitlist_entry::Entity::find()
            .filter(waitlist_entry::Column::CourseId.eq(course_id))
            .filter(waitlist_entry::Column::Status.eq(WaitlistStatus::Waiting))
            .order_by_asc(waitlist_entry::Column::Position)
            .one(&self.db)
            .await?;
        let Some(next) = next else {
            return Ok(None);
        };

        let mut active: waitlist_entry::ActiveModel = next.into();
        active.status = Set(WaitlistStatus::Notified);
        active.notified_at = Set(Some(Utc::now()));
        let notified = active.update(&self.db).await?;

        if let Some(user) = best_effort("load_waitlisted_user", load_user(&self.db, &notified.user_id)).await {
            best_effort(
                "waitlist_email",
                self.email.send(waitlist_seat_available(&user.email, &user.username, &course.title)),
            )
            .await;
        }
        info!(course_id, user_id = %notified.user_id, "Waitlist seat offered");
        Ok(Some(notified))
    }
}

pub(crate) async fn live_enrollments<C: ConnectionTrait>(db: &C, course_id: &str) -> DomainResult<u64> {
    Ok(enrollment::Entity::find()
        .filter(enrollment::Column::CourseId.eq(course_id))
        .filter(enrollment::Column::Status.is_in([EnrollmentStatus::Active, EnrollmentStatus::Completed]))
        .count(db)
        .await?)
}

async fn queued_entry<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    course_id: &str,
) -> DomainResult<Option<waitlist_entry::Model>> {
    Ok(waitlist_entry::Entity::find()
        .filter(waitlist_entry::Column::CourseId.eq(course_id))
        .filter(waitlist_entry::Column::UserId.eq(user_id))
        .filter(waitlist_entry::Column::Status.is_in([WaitlistStatus::Waiting, WaitlistStatus::Notified]))
        .one(db)
        .await?)
}

/// Close the user's queued entry once they hold a seat.
pub(crate) async fn mark_enrolled<C: ConnectionTrait>(db: &C, user_id: &str, course_id: &str) -> DomainResult<()> {
    if let Some(entry) = queued_entry(db, user_id, course_id).await? {
        let mut active: waitlist_entry::ActiveModel = entry.into();
        active.status = Set(WaitlistStatus::Enrolled);
        active.update(db).await?;
    }
    Ok(())
}
