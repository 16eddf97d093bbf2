//! Video bookmarks, timestamped notes and watch progress

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;
use tracing::{debug, warn};

use super::learning::{CourseProgress, LearningService};
use super::{ensure_enrolled, load_lesson, new_id, required};
use crate::domain::video::watched_enough;
use crate::domain::Actor;
use crate::infrastructure::database::entities::{video_bookmark, video_note, watch_activity, watch_progress};
use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Serialize)]
pub struct ProgressUpdate {
    pub progress: watch_progress::Model,
    /// Filled when this update completed the lesson
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_progress: Option<CourseProgress>,
}

/// The first save on a UTC day marks that day active; later saves that day are no-ops.
async fn record_watch_day<C: ConnectionTrait>(
    db: &C,
    student_id: &str,
    lesson_id: &str,
    at: DateTime<Utc>,
) -> DomainResult<()> {
    let row = watch_activity::ActiveModel {
        id: Set(new_id()),
        student_id: Set(student_id.to_string()),
        lesson_id: Set(lesson_id.to_string()),
        day: Set(at.date_naive()),
        first_seen_at: Set(at),
    };
    watch_activity::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([
                watch_activity::Column::StudentId,
                watch_activity::Column::LessonId,
                watch_activity::Column::Day,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

fn non_negative(position_seconds: i32) -> DomainResult<i32> {
    if position_seconds < 0 {
        Err(DomainError::validation("Position must not be negative"))
    } else {
        Ok(position_seconds)
    }
}

pub struct VideoFeaturesService {
    db: DatabaseConnection,
    learning: Arc<LearningService>,
}

impl VideoFeaturesService {
    pub fn new(db: DatabaseConnection, learning: Arc<LearningService>) -> Self {
        Self { db, learning }
    }

    pub async fn add_bookmark(
        &self,
        actor: &Actor,
        lesson_id: &str,
        position_seconds: i32,
        label: Option<String>,
    ) -> DomainResult<video_bookmark::Model> {
        self.ensure_can_watch(actor, lesson_id).await?;
        Ok(video_bookmark::ActiveModel {
            id: Set(new_id()),
            student_id: Set(actor.user_id.clone()),
            lesson_id: Set(lesson_id.to_string()),
            position_seconds: Set(non_negative(position_seconds)?),
            label: Set(label),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?)
    }

    pub async fn list_bookmarks(&self, student_id: &str, lesson_id: &str) -> DomainResult<Vec<video_bookmark::Model>> {
        Ok(video_bookmark::Entity::find()
            .filter(video_bookmark::Column::StudentId.eq(student_id))
            .filter(video_bookmark::Column::LessonId.eq(lesson_id))
            .order_by_asc(video_bookmark::Column::PositionSeconds)
            .all(&self.db)
            .await?)
    }

    pub async fn delete_bookmark(&self, actor: &Actor, bookmark_id: &str) -> DomainResult<()> {
        let found = video_bookmark::Entity::find_by_id(bookmark_id.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Bookmark", bookmark_id))?;
        if found.student_id != actor.user_id {
            return Err(DomainError::forbidden("You do not own this bookmark"));
        }
        video_bookmark::Entity::delete_by_id(bookmark_id.to_string()).exec(&self.db).await?;
        Ok(())
    }

    pub async fn add_note(&self, actor: &Actor, lesson_id: &str, position_seconds: i32, body: &str) -> DomainResult<video_note::Model> {
        self.ensure_can_watch(actor, lesson_id).await?;
        let now = Utc::now();
        Ok(video_note::ActiveModel {
            id: Set(new_id()),
            student_id: Set(actor.user_id.clone()),
            lesson_id: Set(lesson_id.to_string()),
            position_seconds: Set(non_negative(position_seconds)?),
            body: Set(required("body", body)?),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?)
    }

    pub async fn list_notes(&self, student_id: &str, lesson_id: &str) -> DomainResult<Vec<video_note::Model>> {
        Ok(video_note::Entity::find()
            .filter(video_note::Column::StudentId.eq(student_id))
            .filter(video_note::Column::LessonId.eq(lesson_id))
            .order_by_asc(video_note::Column::PositionSeconds)
            .all(&self.db)
            .await?)
    }

    pub async fn update_note(&self, actor: &Actor, note_id: &str, body: &str) -> DomainResult<video_note::Model> {
        let note = self.own_note(actor, note_id).await?;
        let mut active: video_note::ActiveModel = note.into();
        active.body = Set(required("body", body)?);
        active.updated_at = Set(Utc::now());
        Ok(active.update(&self.db).await?)
    }

    pub async fn delete_note(&self, actor: &Actor, note_id: &str) -> DomainResult<()> {
        self.own_note(actor, note_id).await?;
        video_note::Entity::delete_by_id(note_id.to_string()).exec(&self.db).await?;
        Ok(())
    }

    /// Upsert the playback position. Crossing the watch threshold completes the lesson.
    pub async fn save_progress(
        &self,
        actor: &Actor,
        lesson_id: &str,
        position_seconds: i64,
        duration_seconds: i64,
    ) -> DomainResult<ProgressUpdate> {
        if position_seconds < 0 || duration_seconds < 0 {
            return Err(DomainError::validation("Position and duration must not be negative"));
        }
        self.ensure_can_watch(actor, lesson_id).await?;
        let position_seconds = if duration_seconds > 0 {
            position_seconds.min(duration_seconds)
        } else {
            position_seconds
        };
        let reached = watched_enough(position_seconds, duration_seconds);
        let now = Utc::now();

        let existing = self.find_progress(&actor.user_id, lesson_id).await?;
        let was_completed = existing.as_ref().is_some_and(|p| p.completed);
        let progress = match existing {
            Some(p) => {
                let mut active: watch_progress::ActiveModel = p.into();
                active.position_seconds = Set(position_seconds);
                active.duration_seconds = Set(duration_seconds);
                active.completed = Set(was_completed || reached);
                active.updated_at = Set(now);
                active.update(&self.db).await?
            }
            None => {
                watch_progress::ActiveModel {
                    id: Set(new_id()),
                    student_id: Set(actor.user_id.clone()),
                    lesson_id: Set(lesson_id.to_string()),
                    position_seconds: Set(position_seconds),
                    duration_seconds: Set(duration_seconds),
                    completed: Set(reached),
                    updated_at: Set(now),
                }
                .insert(&self.db)
                .await?
            }
        };
        record_watch_day(&self.db, &actor.user_id, lesson_id, now).await?;
        debug!(lesson_id, position_seconds, duration_seconds, "Watch progress saved");

        let course_progress = if reached && !was_completed {
            match self.learning.complete_lesson(&actor.user_id, lesson_id, None).await {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!(lesson_id, error = %e, "Failed to complete lesson from watch progress");
                    None
                }
            }
        } else {
            None
        };
        Ok(ProgressUpdate {
            progress,
            course_progress,
        })
    }

    pub async fn get_progress(&self, student_id: &str, lesson_id: &str) -> DomainResult<Option<watch_progress::Model>> {
        self.find_progress(student_id, lesson_id).await
    }

    async fn find_progress(&self, student_id: &str, lesson_id: &str) -> DomainResult<Option<watch_progress::Model>> {
        Ok(watch_progress::Entity::find()
            .filter(watch_progress::Column::StudentId.eq(student_id))
            .filter(watch_progress::Column::LessonId.eq(lesson_id))
            .one(&self.db)
            .await?)
    }

    async fn own_note(&self, actor: &Actor, note_id: &str) -> DomainResult<video_note::Model> {
        let note = video_note::Entity::find_by_id(note_id.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Note", note_id))?;
        if note.student_id != actor.user_id {
            return Err(DomainError::forbidden("You do not own this note"));
        }
        Ok(note)
    }

    async fn ensure_can_watch(&self, actor: &Actor, lesson_id: &str) -> DomainResult<()> {
        let lesson = load_lesson(&self.db, lesson_id).await?;
        ensure_enrolled(&self.db, &actor.user_id, &lesson.course_id).await
    }
}
