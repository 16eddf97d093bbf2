use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SubscribeRequest {
    #[validate(length(min = 1, max = 32))]
    pub plan: String,
}
