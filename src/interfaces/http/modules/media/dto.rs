use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Query accompanying a raw upload body.
#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct UploadParams {
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
    pub course_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct VideoUploadRequest {
    pub course_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LiveStreamRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}
