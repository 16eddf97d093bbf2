use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub body: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ReplyRequest {
    #[validate(length(min = 1))]
    pub body: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PinRequest {
    pub pinned: bool,
}
