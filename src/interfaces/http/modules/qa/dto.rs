use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AskRequest {
    pub lesson_id: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub body: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AnswerRequest {
    #[validate(length(min = 1))]
    pub body: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct QuestionFilter {
    /// OPEN, ANSWERED or CLOSED
    pub status: Option<String>,
}
