use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(max = 5000))]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: Option<i32>,
    #[validate(length(max = 5000))]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ReviewReplyRequest {
    #[validate(length(min = 1, max = 5000))]
    pub reply: String,
}
