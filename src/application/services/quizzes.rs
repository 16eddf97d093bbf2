//! Quizzes, questions and graded attempts

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ensure_enrolled, load_course, load_lesson, load_owned_course, new_id, required};
use crate::domain::quiz::{grade, time_limit_exceeded, validate_settings, GradeOutcome, QuestionKey, QuestionKind};
use crate::domain::Actor;
use crate::infrastructure::database::entities::{quiz, quiz_attempt, quiz_question};
use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Deserialize)]
pub struct NewQuiz {
    pub lesson_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub passing_score: i32,
    pub max_attempts: Option<i32>,
    pub time_limit_minutes: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewQuestion {
    pub prompt: String,
    pub kind: QuestionKind,
    pub options: Vec<String>,
    pub correct: Vec<u32>,
    pub points: i32,
}

/// Question as shown to a participant; `correct` is only filled for the course owner.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: String,
    pub prompt: String,
    pub kind: QuestionKind,
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct: Option<Vec<u32>>,
    pub points: i32,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizView {
    #[serde(flatten)]
    pub quiz: quiz::Model,
    pub questions: Vec<QuestionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptResult {
    pub attempt: quiz_attempt::Model,
    pub outcome: GradeOutcome,
    pub timed_out: bool,
}

pub struct QuizService {
    db: DatabaseConnection,
}

impl QuizService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_quiz(&self, actor: &Actor, course_id: &str, input: NewQuiz) -> DomainResult<quiz::Model> {
        load_owned_course(&self.db, actor, course_id).await?;
        validate_settings(input.passing_score, input.max_attempts)?;
        if matches!(input.time_limit_minutes, Some(m) if m < 1) {
            return Err(DomainError::validation("Time limit must be at least one minute"));
        }
        if let Some(lesson_id) = &input.lesson_id {
            let lesson = load_lesson(&self.db, lesson_id).await?;
            if lesson.course_id != course_id {
                return Err(DomainError::validation("Lesson belongs to another course"));
            }
        }
        let created = quiz::ActiveModel {
            id: Set(new_id()),
            course_id: Set(course_id.to_string()),
            lesson_id: Set(input.lesson_id),
            title: Set(required("title", &input.title)?),
            description: Set(input.description),
            passing_score: Set(input.passing_score),
            max_attempts: Set(input.max_attempts),
            time_limit_minutes: Set(input.time_limit_minutes),
            created_by: Set(actor.user_id.clone()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?;
        info!(quiz_id = %created.id, course_id, "Quiz created");
        Ok(created)
    }

    pub async fn add_question(&self, actor: &Actor, quiz_id: &str, input: NewQuestion) -> DomainResult<quiz_question::Model> {
        let quiz_model = self.load_quiz(quiz_id).await?;
        load_owned_course(&self.db, actor, &quiz_model.course_id).await?;
        let prompt = required("prompt", &input.prompt)?;
        let key = QuestionKey {
            id: String::new(),
            kind: input.kind,
            options: input.options,
            correct: input.correct,
            points: input.points,
        };
        key.validate()?;

        let position = quiz_question::Entity::find()
            .filter(quiz_question::Column::QuizId.eq(quiz_id))
            .count(&self.db)
            .await? as i32
            + 1;
        Ok(quiz_question::ActiveModel {
            id: Set(new_id()),
            quiz_id: Set(quiz_id.to_string()),
            prompt: Set(prompt),
            kind: Set(key.kind),
            options: Set(serde_json::json!(key.options)),
            correct: Set(serde_json::json!(key.correct)),
            points: Set(key.points),
            position: Set(position),
        }
        .insert(&self.db)
        .await?)
    }

    /// Answers are only revealed to the course owner.
    pub async fn get(&self, actor: &Actor, quiz_id: &str) -> DomainResult<QuizView> {
        let quiz_model = self.load_quiz(quiz_id).await?;
        let course = load_course(&self.db, &quiz_model.course_id).await?;
        let reveal = actor.owns(&course.teacher_id);
        if !reveal {
            ensure_enrolled(&self.db, &actor.user_id, &course.id).await?;
        }
        let questions = self
            .questions(quiz_id)
            .await?
            .into_iter()
            .map(|q| {
                let key = question_key(&q)?;
                Ok(QuestionView {
                    id: q.id,
                    prompt: q.prompt,
                    kind: q.kind,
                    options: key.options,
                    correct: reveal.then_some(key.correct),
                    points: q.points,
                    position: q.position,
                })
            })
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(QuizView {
            quiz: quiz_model,
            questions,
        })
    }

    pub async fn list_for_course(&self, course_id: &str) -> DomainResult<Vec<quiz::Model>> {
        Ok(quiz::Entity::find()
            .filter(quiz::Column::CourseId.eq(course_id))
            .order_by_asc(quiz::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    pub async fn start_attempt(&self, actor: &Actor, quiz_id: &str) -> DomainResult<quiz_attempt::Model> {
        let quiz_model = self.load_quiz(quiz_id).await?;
        ensure_enrolled(&self.db, &actor.user_id, &quiz_model.course_id).await?;
        if let Some(max) = quiz_model.max_attempts {
            let used = quiz_attempt::Entity::find()
                .filter(quiz_attempt::Column::QuizId.eq(quiz_id))
                .filter(quiz_attempt::Column::StudentId.eq(&actor.user_id))
                .count(&self.db)
                .await?;
            if used >= max as u64 {
                return Err(DomainError::validation("Maximum number of attempts reached"));
            }
        }
        let attempt = quiz_attempt::ActiveModel {
            id: Set(new_id()),
            quiz_id: Set(quiz_id.to_string()),
            student_id: Set(actor.user_id.clone()),
            answers: Set(None),
            score_percent: Set(None),
            points: Set(0),
            passed: Set(false),
            started_at: Set(Utc::now()),
            submitted_at: Set(None),
        }
        .insert(&self.db)
        .await?;
        info!(attempt_id = %attempt.id, quiz_id, student_id = %actor.user_id, "Quiz attempt started");
        Ok(attempt)
    }

    /// Grade an open attempt. Past the time limit the attempt is recorded as a failed zero.
    pub async fn submit_attempt(
        &self,
        actor: &Actor,
        attempt_id: &str,
        answers: HashMap<String, Vec<u32>>,
    ) -> DomainResult<AttemptResult> {
        let attempt = quiz_attempt::Entity::find_by_id(attempt_id.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Quiz attempt", attempt_id))?;
        if attempt.student_id != actor.user_id {
            return Err(DomainError::forbidden("You do not own this attempt"));
        }
        if attempt.submitted_at.is_some() {
            return Err(DomainError::Conflict("Attempt already submitted".into()));
        }
        let quiz_model = self.load_quiz(&attempt.quiz_id).await?;
        let keys = self
            .questions(&quiz_model.id)
            .await?
            .iter()
            .map(question_key)
            .collect::<DomainResult<Vec<_>>>()?;

        let now = Utc::now();
        let timed_out = time_limit_exceeded(attempt.started_at, now, quiz_model.time_limit_minutes);
        let mut outcome = grade(&keys, &answers, quiz_model.passing_score);
        if timed_out {
            outcome = GradeOutcome {
                points: 0,
                score_percent: 0,
                passed: false,
                ..outcome
            };
        }

        let mut active: quiz_attempt::ActiveModel = attempt.into();
        active.answers = Set(Some(serde_json::json!(answers)));
        active.score_percent = Set(Some(outcome.score_percent));
        active.points = Set(outcome.points);
        active.passed = Set(outcome.passed);
        active.submitted_at = Set(Some(now));
        let attempt = active.update(&self.db).await?;
        info!(
            attempt_id,
            score = outcome.score_percent,
            passed = outcome.passed,
            timed_out,
            "Quiz attempt graded"
        );
        Ok(AttemptResult {
            attempt,
            outcome,
            timed_out,
        })
    }

    /// Course owners see every attempt, students only their own.
    pub async fn list_attempts(&self, actor: &Actor, quiz_id: &str) -> DomainResult<Vec<quiz_attempt::Model>> {
        let quiz_model = self.load_quiz(quiz_id).await?;
        let course = load_course(&self.db, &quiz_model.course_id).await?;
        let mut query = quiz_attempt::Entity::find().filter(quiz_attempt::Column::QuizId.eq(quiz_id));
        if !actor.owns(&course.teacher_id) {
            query = query.filter(quiz_attempt::Column::StudentId.eq(&actor.user_id));
        }
        Ok(query
            .order_by_desc(quiz_attempt::Column::StartedAt)
            .all(&self.db)
            .await?)
    }

    pub async fn best_score(&self, student_id: &str, quiz_id: &str) -> DomainResult<Option<i32>> {
        let best = quiz_attempt::Entity::find()
            .filter(quiz_attempt::Column::QuizId.eq(quiz_id))
            .filter(quiz_attempt::Column::StudentId.eq(student_id))
            .filter(quiz_attempt::Column::ScorePercent.is_not_null())
            .order_by_desc(quiz_attempt::Column::ScorePercent)
            .one(&self.db)
            .await?;
        Ok(best.and_then(|a| a.score_percent))
    }

    async fn load_quiz(&self, quiz_id: &str) -> DomainResult<quiz::Model> {
        quiz::Entity::find_by_id(quiz_id.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Quiz", quiz_id))
    }

    async fn questions(&self, quiz_id: &str) -> DomainResult<Vec<quiz_question::Model>> {
        Ok(quiz_question::Entity::find()
            .filter(quiz_question::Column::QuizId.eq(quiz_id))
            .order_by_asc(quiz_question::Column::Position)
            .all(&self.db)
            .await?)
    }
}

fn question_key(q: &quiz_question::Model) -> DomainResult<QuestionKey> {
    let corrupt = |e: serde_json::Error| DomainError::Database(format!("question {}: {}", q.id, e));
    Ok(QuestionKey {
        id: q.id.clone(),
        kind: q.kind,
        options: serde_json::from_value(q.options.clone()).map_err(corrupt)?,
        correct: serde_json::from_value(q.correct.clone()).map_err(corrupt)?,
        points: q.points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_key_reads_json_columns() {
        let model = quiz_question::Model {
            id: "q1".into(),
            quiz_id: "quiz".into(),
            prompt: "2 + 2?".into(),
            kind: QuestionKind::Single,
            options: serde_json::json!(["3", "4"]),
            correct: serde_json::json!([1]),
            points: 2,
            position: 1,
        };
        let key = question_key(&model).unwrap();
        assert_eq!(key.options, vec!["3", "4"]);
        assert!(key.is_correct(&[1]));
    }

    #[test]
    fn malformed_options_surface_as_error() {
        let model = quiz_question::Model {
            id: "q1".into(),
            quiz_id: "quiz".into(),
            prompt: "?".into(),
            kind: QuestionKind::Single,
            options: serde_json::json!({"a": 1}),
            correct: serde_json::json!([0]),
            points: 1,
            position: 1,
        };
        assert!(question_key(&model).is_err());
    }
}
