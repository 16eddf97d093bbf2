use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct StartImportRequest {
    /// UDEMY, COURSERA, PLURALSIGHT or YOUTUBE
    pub provider: String,
    /// Course id, slug or playlist id on the provider
    #[validate(length(min = 1, max = 200))]
    pub external_id: String,
}
