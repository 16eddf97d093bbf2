//! Lesson progress and learning paths

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;
use tracing::info;

use super::enrollment::{find_enrollment, set_progress};
use super::{load_course, load_lesson, new_id, required};
use crate::domain::enrollment::{progress_from_lessons, EnrollmentStatus};
use crate::domain::Actor;
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::database::entities::{
    course, enrollment, learning_path, learning_path_course, lesson, lesson_progress,
};
use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Serialize)]
pub struct CourseProgress {
    pub course_id: String,
    pub completed_lessons: u64,
    pub total_lessons: u64,
    pub percent: i32,
    pub completed_lesson_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PathCourse {
    pub position: i32,
    pub course: course::Model,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PathDetails {
    #[serde(flatten)]
    pub path: learning_path::Model,
    pub courses: Vec<PathCourse>,
    pub completed_courses: usize,
    pub percent: i32,
}

pub struct LearningService {
    db: DatabaseConnection,
    cache: Arc<CacheService>,
}

impl LearningService {
    pub fn new(db: DatabaseConnection, cache: Arc<CacheService>) -> Self {
        Self { db, cache }
    }

    /// Mark a lesson done and recompute the enrollment's progress.
    pub async fn complete_lesson(
        &self,
        student_id: &str,
        lesson_id: &str,
        time_spent_seconds: Option<i32>,
    ) -> DomainResult<CourseProgress> {
        let lesson_model = load_lesson(&self.db, lesson_id).await?;
        let enrolled = find_enrollment(&self.db, student_id, &lesson_model.course_id)
            .await?
            .filter(|e| e.status.is_live())
            .ok_or_else(|| DomainError::forbidden("You must be enrolled in this course"))?;

        let now = Utc::now();
        let existing = lesson_progress::Entity::find()
            .filter(lesson_progress::Column::StudentId.eq(student_id))
            .filter(lesson_progress::Column::LessonId.eq(lesson_id))
            .one(&self.db)
            .await?;
        let extra = time_spent_seconds.unwrap_or(0).max(0);
        match existing {
            Some(p) => {
                let was_completed = p.completed;
                let spent = p.time_spent_seconds;
                let mut active: lesson_progress::ActiveModel = p.into();
                active.completed = Set(true);
                if !was_completed {
                    active.completed_at = Set(Some(now));
                }
                active.time_spent_seconds = Set(spent + extra);
                active.updated_at = Set(now);
                active.update(&self.db).await?;
            }
            None => {
                lesson_progress::ActiveModel {
                    id: Set(new_id()),
                    student_id: Set(student_id.to_string()),
                    lesson_id: Set(lesson_id.to_string()),
                    course_id: Set(lesson_model.course_id.clone()),
                    completed: Set(true),
                    completed_at: Set(Some(now)),
                    time_spent_seconds: Set(extra),
                    updated_at: Set(now),
                }
                .insert(&self.db)
                .await?;
            }
        }

        let progress = self.course_progress(student_id, &lesson_model.course_id).await?;
        if enrolled.status == EnrollmentStatus::Active && enrolled.progress_percent != progress.percent {
            set_progress(&self.db, enrolled, progress.percent).await?;
        }
        self.cache.delete_pattern(&format!("dashboard:*:{}", student_id));
        info!(student_id, lesson_id, percent = progress.percent, "Lesson completed");
        Ok(progress)
    }

    pub async fn course_progress(&self, student_id: &str, course_id: &str) -> DomainResult<CourseProgress> {
        let total = lesson::Entity::find()
            .filter(lesson::Column::CourseId.eq(course_id))
            .count(&self.db)
            .await?;
        let completed_lesson_ids: Vec<String> = lesson_progress::Entity::find()
            .filter(lesson_progress::Column::StudentId.eq(student_id))
            .filter(lesson_progress::Column::CourseId.eq(course_id))
            .filter(lesson_progress::Column::Completed.eq(true))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|p| p.lesson_id)
            .collect();
        let completed = completed_lesson_ids.len() as u64;
        Ok(CourseProgress {
            course_id: course_id.to_string(),
            completed_lessons: completed,
            total_lessons: total,
            percent: progress_from_lessons(completed, total),
            completed_lesson_ids,
        })
    }

    pub async fn create_path(&self, actor: &Actor, title: &str, description: Option<String>) -> DomainResult<learning_path::Model> {
        actor.ensure_teacher()?;
        let created = learning_path::ActiveModel {
            id: Set(new_id()),
            title: Set(required("title", title)?),
            description: Set(description),
            created_by: Set(actor.user_id.clone()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?;
        info!(path_id = %created.id, "Learning path created");
        Ok(created)
    }

    /// Appends the course at the end of the path.
    pub async fn add_course_to_path(&self, actor: &Actor, path_id: &str, course_id: &str) -> DomainResult<learning_path_course::Model> {
        let path = self.load_path(path_id).await?;
        actor.ensure_owns(&path.created_by, "learning path")?;
        load_course(&self.db, course_id).await?;
        let linked = learning_path_course::Entity::find_by_id((path_id.to_string(), course_id.to_string()))
            .one(&self.db)
            .await?;
        if linked.is_some() {
            return Err(DomainError::Conflict("Course is already in the path".into()));
        }
        let last = learning_path_course::Entity::find()
            .filter(learning_path_course::Column::PathId.eq(path_id))
            .order_by_desc(learning_path_course::Column::Position)
            .one(&self.db)
            .await?;
        Ok(learning_path_course::ActiveModel {
            path_id: Set(path_id.to_string()),
            course_id: Set(course_id.to_string()),
            position: Set(last.map(|l| l.position).unwrap_or(0) + 1),
        }
        .insert(&self.db)
        .await?)
    }

    /// Path with per-course completion for `student_id`.
    pub async fn get_path(&self, path_id: &str, student_id: &str) -> DomainResult<PathDetails> {
        let path = self.load_path(path_id).await?;
        let links = learning_path_course::Entity::find()
            .filter(learning_path_course::Column::PathId.eq(path_id))
            .order_by_asc(learning_path_course::Column::Position)
            .all(&self.db)
            .await?;
        let completed: HashSet<String> = enrollment::Entity::find()
            .filter(enrollment::Column::StudentId.eq(student_id))
            .filter(enrollment::Column::Status.eq(EnrollmentStatus::Completed))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|e| e.course_id)
            .collect();

        let mut courses = Vec::with_capacity(links.len());
        for link in links {
            let course = load_course(&self.db, &link.course_id).await?;
            courses.push(PathCourse {
                position: link.position,
                completed: completed.contains(&course.id),
                course,
            });
        }
        let done = courses.iter().filter(|c| c.completed).count();
        Ok(PathDetails {
            percent: progress_from_lessons(done as u64, courses.len() as u64),
            completed_courses: done,
            path,
            courses,
        })
    }

    pub async fn list_paths(&self) -> DomainResult<Vec<learning_path::Model>> {
        Ok(learning_path::Entity::find()
            .order_by_desc(learning_path::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn load_path(&self, path_id: &str) -> DomainResult<learning_path::Model> {
        learning_path::Entity::find_by_id(path_id.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Learning path", path_id))
    }
}
