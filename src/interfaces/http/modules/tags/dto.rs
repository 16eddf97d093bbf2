use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateTagRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}

/// Tag names; unknown names are created on the fly
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AttachTagsRequest {
    #[validate(length(min = 1, max = 20))]
    pub names: Vec<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PopularTagsParams {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}
