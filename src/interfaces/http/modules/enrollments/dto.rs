use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateProgressRequest {
    #[validate(range(min = 0, max = 100))]
    pub progress_percent: i32,
}
