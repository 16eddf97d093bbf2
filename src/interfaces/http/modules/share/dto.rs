use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct CreateShareRequest {
    /// Where the link will be posted, e.g. "twitter" or "email"
    #[validate(length(min = 1, max = 32))]
    pub channel: Option<String>,
}
