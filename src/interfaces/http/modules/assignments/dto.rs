use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::application::services::assignments::{Grade, NewAssignment, NewSubmission};

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateAssignmentRequest {
    pub lesson_id: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub instructions: String,
    pub due_at: Option<DateTime<Utc>>,
    #[validate(range(min = 1))]
    #[serde(default = "default_max_points")]
    pub max_points: i32,
}

fn default_max_points() -> i32 {
    100
}

impl From<CreateAssignmentRequest> for NewAssignment {
    fn from(r: CreateAssignmentRequest) -> Self {
        Self {
            lesson_id: r.lesson_id,
            title: r.title,
            instructions: r.instructions,
            due_at: r.due_at,
            max_points: r.max_points,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SubmitWorkRequest {
    #[validate(length(min = 1))]
    pub content: String,
    #[validate(url)]
    pub attachment_url: Option<String>,
}

impl From<SubmitWorkRequest> for NewSubmission {
    fn from(r: SubmitWorkRequest) -> Self {
        Self {
            content: r.content,
            attachment_url: r.attachment_url,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct GradeRequest {
    #[validate(range(min = 0))]
    pub points: i32,
    pub feedback: Option<String>,
    #[serde(default)]
    pub return_for_revision: bool,
}

impl From<GradeRequest> for Grade {
    fn from(r: GradeRequest) -> Self {
        Self {
            points: r.points,
            feedback: r.feedback,
            return_for_revision: r.return_for_revision,
        }
    }
}
