use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AddPrerequisiteRequest {
    #[validate(length(min = 1))]
    pub prerequisite_id: String,
}
