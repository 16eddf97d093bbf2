use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct BookmarkRequest {
    #[validate(range(min = 0))]
    pub position_seconds: i32,
    #[validate(length(max = 100))]
    pub label: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct NoteRequest {
    #[validate(range(min = 0))]
    pub position_seconds: i32,
    #[validate(length(min = 1, max = 10000))]
    pub body: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateNoteRequest {
    #[validate(length(min = 1, max = 10000))]
    pub body: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct WatchProgressRequest {
    #[validate(range(min = 0))]
    pub position_seconds: i64,
    #[validate(range(min = 0))]
    pub duration_seconds: i64,
}
