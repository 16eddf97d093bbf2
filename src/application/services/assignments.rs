//! Assignments and graded submissions

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use tracing::info;

use super::{ensure_enrolled, load_course, load_owned_course, new_id, required};
use crate::domain::assignment::{is_late, validate_grade, SubmissionStatus};
use crate::domain::Actor;
use crate::infrastructure::database::entities::{assignment, submission};
use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Deserialize)]
pub struct NewAssignment {
    pub lesson_id: Option<String>,
    pub title: String,
    pub instructions: String,
    pub due_at: Option<DateTime<Utc>>,
    pub max_points: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSubmission {
    pub content: String,
    pub attachment_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Grade {
    pub points: i32,
    pub feedback: Option<String>,
    /// Send the work back for another round instead of finalising the grade.
    #[serde(default)]
    pub return_for_revision: bool,
}

pub struct AssignmentService {
    db: DatabaseConnection,
}

impl AssignmentService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, actor: &Actor, course_id: &str, input: NewAssignment) -> DomainResult<assignment::Model> {
        load_owned_course(&self.db, actor, course_id).await?;
        if input.max_points <= 0 {
            return Err(DomainError::validation("Max points must be positive"));
        }
        let created = assignment::ActiveModel {
            id: Set(new_id()),
            course_id: Set(course_id.to_string()),
            lesson_id: Set(input.lesson_id),
            title: Set(required("title", &input.title)?),
            instructions: Set(input.instructions),
            due_at: Set(input.due_at),
            max_points: Set(input.max_points),
            created_by: Set(actor.user_id.clone()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?;
        info!(assignment_id = %created.id, course_id, "Assignment created");
        Ok(created)
    }

    pub async fn list_for_course(&self, course_id: &str) -> DomainResult<Vec<assignment::Model>> {
        Ok(assignment::Entity::find()
            .filter(assignment::Column::CourseId.eq(course_id))
            .order_by_asc(assignment::Column::DueAt)
            .all(&self.db)
            .await?)
    }

    pub async fn get(&self, assignment_id: &str) -> DomainResult<assignment::Model> {
        assignment::Entity::find_by_id(assignment_id.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Assignment", assignment_id))
    }

    /// One submission per student; resubmitting overwrites it until graded.
    pub async fn submit(&self, actor: &Actor, assignment_id: &str, input: NewSubmission) -> DomainResult<submission::Model> {
        let task = self.get(assignment_id).await?;
        ensure_enrolled(&self.db, &actor.user_id, &task.course_id).await?;
        let content = required("content", &input.content)?;
        let now = Utc::now();
        let late = is_late(task.due_at, now);

        let existing = submission::Entity::find()
            .filter(submission::Column::AssignmentId.eq(assignment_id))
            .filter(submission::Column::StudentId.eq(&actor.user_id))
            .one(&self.db)
            .await?;
        let saved = match existing {
            Some(previous) => {
                if !previous.status.accepts_resubmission() {
                    return Err(DomainError::Conflict("Submission has already been graded".into()));
                }
                let mut active: submission::ActiveModel = previous.into();
                active.content = Set(content);
                active.attachment_url = Set(input.attachment_url);
                active.status = Set(SubmissionStatus::Submitted);
                active.is_late = Set(late);
                active.submitted_at = Set(now);
                active.update(&self.db).await?
            }
            None => {
                submission::ActiveModel {
                    id: Set(new_id()),
                    assignment_id: Set(assignment_id.to_string()),
                    student_id: Set(actor.user_id.clone()),
                    content: Set(content),
                    attachment_url: Set(input.attachment_url),
                    status: Set(SubmissionStatus::Submitted),
                    points: Set(None),
                    feedback: Set(None),
                    is_late: Set(late),
                    submitted_at: Set(now),
                    graded_at: Set(None),
                }
                .insert(&self.db)
                .await?
            }
        };
        info!(submission_id = %saved.id, assignment_id, late, "Assignment submitted");
        Ok(saved)
    }

    pub async fn grade(&self, actor: &Actor, submission_id: &str, input: Grade) -> DomainResult<submission::Model> {
        let work = submission::Entity::find_by_id(submission_id.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Submission", submission_id))?;
        let task = self.get(&work.assignment_id).await?;
        load_owned_course(&self.db, actor, &task.course_id).await?;
        validate_grade(input.points, task.max_points)?;

        let status = if input.return_for_revision {
            SubmissionStatus::Returned
        } else {
            SubmissionStatus::Graded
        };
        let mut active: submission::ActiveModel = work.into();
        active.points = Set(Some(input.points));
        active.feedback = Set(input.feedback);
        active.status = Set(status);
        active.graded_at = Set(Some(Utc::now()));
        let graded = active.update(&self.db).await?;
        info!(submission_id, points = input.points, status = %status, "Submission graded");
        Ok(graded)
    }

    /// Course owners see every submission, students their own.
    pub async fn list_submissions(&self, actor: &Actor, assignment_id: &str) -> DomainResult<Vec<submission::Model>> {
        let task = self.get(assignment_id).await?;
        let course = load_course(&self.db, &task.course_id).await?;
        let mut query = submission::Entity::find().filter(submission::Column::AssignmentId.eq(assignment_id));
        if !actor.owns(&course.teacher_id) {
            query = query.filter(submission::Column::StudentId.eq(&actor.user_id));
        }
        Ok(query
            .order_by_asc(submission::Column::SubmittedAt)
            .all(&self.db)
            .await?)
    }
}
