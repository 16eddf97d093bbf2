//! Personal and course calendar events

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Condition;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::Deserialize;
use tracing::info;

use super::{load_course, new_id, required, taught_course_ids};
use crate::domain::calendar::{validate_range, EventKind};
use crate::domain::enrollment::EnrollmentStatus;
use crate::domain::Actor;
use crate::infrastructure::database::entities::{calendar_event, enrollment};
use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
    pub course_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub kind: EventKind,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub location: Option<String>,
    pub meeting_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub meeting_url: Option<String>,
}

pub struct CalendarService {
    db: DatabaseConnection,
}

impl CalendarService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Course events can only be created by that course's teacher.
    pub async fn create(&self, actor: &Actor, input: NewEvent) -> DomainResult<calendar_event::Model> {
        validate_range(input.starts_at, input.ends_at)?;
        if let Some(course_id) = &input.course_id {
            let course = load_course(&self.db, course_id).await?;
            actor.ensure_owns(&course.teacher_id, "course")?;
        }
        let created = calendar_event::ActiveModel {
            id: Set(new_id()),
            course_id: Set(input.course_id),
            owner_id: Set(actor.user_id.clone()),
            title: Set(required("title", &input.title)?),
            description: Set(input.description),
            kind: Set(input.kind),
            starts_at: Set(input.starts_at),
            ends_at: Set(input.ends_at),
            location: Set(input.location),
            meeting_url: Set(input.meeting_url),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?;
        info!(event_id = %created.id, kind = %created.kind, "Calendar event created");
        Ok(created)
    }

    pub async fn update(&self, actor: &Actor, event_id: &str, changes: EventChanges) -> DomainResult<calendar_event::Model> {
        let event = self.load(event_id).await?;
        actor.ensure_owns(&event.owner_id, "event")?;
        let starts_at = changes.starts_at.unwrap_or(event.starts_at);
        let ends_at = changes.ends_at.unwrap_or(event.ends_at);
        validate_range(starts_at, ends_at)?;

        let mut active: calendar_event::ActiveModel = event.into();
        if let Some(title) = changes.title {
            active.title = Set(required("title", &title)?);
        }
        if changes.description.is_some() {
            active.description = Set(changes.description);
        }
        if changes.location.is_some() {
            active.location = Set(changes.location);
        }
        if changes.meeting_url.is_some() {
            active.meeting_url = Set(changes.meeting_url);
        }
        active.starts_at = Set(starts_at);
        active.ends_at = Set(ends_at);
        Ok(active.update(&self.db).await?)
    }

    pub async fn delete(&self, actor: &Actor, event_id: &str) -> DomainResult<()> {
        let event = self.load(event_id).await?;
        actor.ensure_owns(&event.owner_id, "event")?;
        calendar_event::Entity::delete_by_id(event_id.to_string()).exec(&self.db).await?;
        Ok(())
    }

    /// Own events plus events of courses the user is enrolled in or teaches,
    /// overlapping `[from, to)`.
    pub async fn list_for_user(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<Vec<calendar_event::Model>> {
        if to <= from {
            return Err(DomainError::validation("Range end must be after its start"));
        }
        let courses = self.visible_course_ids(user_id).await?;
        Ok(calendar_event::Entity::find()
            .filter(
                Condition::any()
                    .add(calendar_event::Column::OwnerId.eq(user_id))
                    .add(calendar_event::Column::CourseId.is_in(courses)),
            )
            .filter(calendar_event::Column::StartsAt.lt(to))
            .filter(calendar_event::Column::EndsAt.gt(from))
            .order_by_asc(calendar_event::Column::StartsAt)
            .all(&self.db)
            .await?)
    }

    /// Next `limit` events that have not ended yet.
    pub async fn upcoming(&self, user_id: &str, limit: u64) -> DomainResult<Vec<calendar_event::Model>> {
        let courses = self.visible_course_ids(user_id).await?;
        Ok(calendar_event::Entity::find()
            .filter(
                Condition::any()
                    .add(calendar_event::Column::OwnerId.eq(user_id))
                    .add(calendar_event::Column::CourseId.is_in(courses)),
            )
            .filter(calendar_event::Column::EndsAt.gt(Utc::now()))
            .order_by_asc(calendar_event::Column::StartsAt)
            .limit(limit)
            .all(&self.db)
            .await?)
    }

    async fn visible_course_ids(&self, user_id: &str) -> DomainResult<Vec<String>> {
        let mut ids: Vec<String> = enrollment::Entity::find()
            .select_only()
            .column(enrollment::Column::CourseId)
            .filter(enrollment::Column::StudentId.eq(user_id))
            .filter(enrollment::Column::Status.is_in([EnrollmentStatus::Active, EnrollmentStatus::Completed]))
            .into_tuple()
            .all(&self.db)
            .await?;
        ids.extend(taught_course_ids(&self.db, user_id).await?);
        Ok(ids)
    }

    async fn load(&self, event_id: &str) -> DomainResult<calendar_event::Model> {
        calendar_event::Entity::find_by_id(event_id.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Calendar event", event_id))
    }
}
