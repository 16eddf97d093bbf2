//! Private questions from students to the course instructor

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Serialize;
use tracing::info;

use super::{ensure_enrolled, load_course, load_lesson, new_id, required};
use crate::domain::qa::QuestionStatus;
use crate::domain::Actor;
use crate::infrastructure::database::entities::{instructor_answer, instructor_question};
use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Serialize)]
pub struct QuestionThread {
    #[serde(flatten)]
    pub question: instructor_question::Model,
    pub answers: Vec<instructor_answer::Model>,
}

pub struct InstructorQaService {
    db: DatabaseConnection,
}

impl InstructorQaService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn ask(
        &self,
        actor: &Actor,
        course_id: &str,
        lesson_id: Option<String>,
        body: &str,
    ) -> DomainResult<instructor_question::Model> {
        ensure_enrolled(&self.db, &actor.user_id, course_id).await?;
        if let Some(lesson_id) = &lesson_id {
            if load_lesson(&self.db, lesson_id).await?.course_id != course_id {
                return Err(DomainError::validation("Lesson belongs to another course"));
            }
        }
        let now = Utc::now();
        let question = instructor_question::ActiveModel {
            id: Set(new_id()),
            course_id: Set(course_id.to_string()),
            lesson_id: Set(lesson_id),
            student_id: Set(actor.user_id.clone()),
            body: Set(required("body", body)?),
            status: Set(QuestionStatus::Open),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;
        info!(question_id = %question.id, course_id, "Instructor question asked");
        Ok(question)
    }

    /// Only the course teacher answers; the question moves to ANSWERED.
    pub async fn answer(&self, actor: &Actor, question_id: &str, body: &str) -> DomainResult<QuestionThread> {
        let question = self.load_question(question_id).await?;
        let course = load_course(&self.db, &question.course_id).await?;
        if course.teacher_id != actor.user_id {
            return Err(DomainError::forbidden("Only the course teacher can answer"));
        }
        if question.status == QuestionStatus::Closed {
            return Err(DomainError::validation("Question is closed"));
        }
        let body = required("body", body)?;

        let now = Utc::now();
        let txn = self.db.begin().await?;
        instructor_answer::ActiveModel {
            id: Set(new_id()),
            question_id: Set(question_id.to_string()),
            instructor_id: Set(actor.user_id.clone()),
            body: Set(body),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;
        let mut active: instructor_question::ActiveModel = question.into();
        active.status = Set(QuestionStatus::Answered);
        active.updated_at = Set(now);
        active.update(&txn).await?;
        txn.commit().await?;

        info!(question_id, "Instructor question answered");
        self.get(actor, question_id).await
    }

    /// Asker or course teacher.
    pub async fn close(&self, actor: &Actor, question_id: &str) -> DomainResult<instructor_question::Model> {
        let question = self.load_question(question_id).await?;
        let course = load_course(&self.db, &question.course_id).await?;
        if question.student_id != actor.user_id && !actor.owns(&course.teacher_id) {
            return Err(DomainError::forbidden("You cannot close this question"));
        }
        let mut active: instructor_question::ActiveModel = question.into();
        active.status = Set(QuestionStatus::Closed);
        active.updated_at = Set(Utc::now());
        Ok(active.update(&self.db).await?)
    }

    pub async fn get(&self, actor: &Actor, question_id: &str) -> DomainResult<QuestionThread> {
        let question = self.load_question(question_id).await?;
        let course = load_course(&self.db, &question.course_id).await?;
        if question.student_id != actor.user_id && !actor.owns(&course.teacher_id) {
            return Err(DomainError::forbidden("You cannot view this question"));
        }
        let answers = instructor_answer::Entity::find()
            .filter(instructor_answer::Column::QuestionId.eq(question_id))
            .order_by_asc(instructor_answer::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(QuestionThread { question, answers })
    }

    /// Teacher view of a course's questions, optionally filtered by status.
    pub async fn list_for_course(
        &self,
        actor: &Actor,
        course_id: &str,
        status: Option<QuestionStatus>,
    ) -> DomainResult<Vec<instructor_question::Model>> {
        let course = load_course(&self.db, course_id).await?;
        actor.ensure_owns(&course.teacher_id, "course")?;
        let mut query = instructor_question::Entity::find().filter(instructor_question::Column::CourseId.eq(course_id));
        if let Some(status) = status {
            query = query.filter(instructor_question::Column::Status.eq(status));
        }
        Ok(query
            .order_by_desc(instructor_question::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    pub async fn list_for_student(&self, student_id: &str) -> DomainResult<Vec<instructor_question::Model>> {
        Ok(instructor_question::Entity::find()
            .filter(instructor_question::Column::StudentId.eq(student_id))
            .order_by_desc(instructor_question::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn load_question(&self, question_id: &str) -> DomainResult<instructor_question::Model> {
        instructor_question::Entity::find_by_id(question_id.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Question", question_id))
    }
}
