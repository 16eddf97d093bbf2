use std::collections::HashMap;

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::application::services::quizzes::{NewQuestion, NewQuiz};
use crate::domain::quiz::QuestionKind;
use crate::interfaces::http::common::{parse_enum, ApiError};

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateQuizRequest {
    pub lesson_id: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    /// Percentage needed to pass
    #[validate(range(min = 0, max = 100))]
    #[serde(default = "default_passing_score")]
    pub passing_score: i32,
    #[validate(range(min = 1))]
    pub max_attempts: Option<i32>,
    #[validate(range(min = 1))]
    pub time_limit_minutes: Option<i32>,
}

fn default_passing_score() -> i32 {
    70
}

impl From<CreateQuizRequest> for NewQuiz {
    fn from(r: CreateQuizRequest) -> Self {
        Self {
            lesson_id: r.lesson_id,
            title: r.title,
            description: r.description,
            passing_score: r.passing_score,
            max_attempts: r.max_attempts,
            time_limit_minutes: r.time_limit_minutes,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1))]
    pub prompt: String,
    /// SINGLE, MULTIPLE or TRUE_FALSE
    pub kind: String,
    #[validate(length(min = 2))]
    pub options: Vec<String>,
    /// Indexes into `options`
    #[validate(length(min = 1))]
    pub correct: Vec<u32>,
    #[validate(range(min = 1))]
    #[serde(default = "default_points")]
    pub points: i32,
}

fn default_points() -> i32 {
    1
}

impl CreateQuestionRequest {
    pub fn into_new_question(self) -> Result<NewQuestion, ApiError> {
        Ok(NewQuestion {
            prompt: self.prompt,
            kind: parse_enum::<QuestionKind>(&self.kind)?,
            options: self.options,
            correct: self.correct,
            points: self.points,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SubmitAttemptRequest {
    /// Question id to selected option indexes
    pub answers: HashMap<String, Vec<u32>>,
}
