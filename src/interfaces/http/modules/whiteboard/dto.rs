use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateWhiteboardRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AppendActionRequest {
    /// Drawing verb, e.g. "stroke", "erase", "text"
    #[validate(length(min = 1, max = 32))]
    pub kind: String,
    #[schema(value_type = Object)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LockRequest {
    pub locked: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SinceParams {
    /// Return actions with `seq` greater than this
    #[serde(default)]
    pub after: i64,
}
