//! Course prerequisite graph

use axum::extract::{Path, State};
use axum::Extension;

use super::dto::AddPrerequisiteRequest;
use crate::application::services::prerequisites::PrerequisiteCheck;
use crate::application::AppServices;
use crate::infrastructure::database::entities::{course, course_prerequisite};
use crate::interfaces::http::common::{created, ok, ApiResult, CreatedResult, EmptyData, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/prerequisites",
    tag = "Prerequisites",
    params(("id" = String, Path, description = "Course ID")),
    responses((status = 200, description = "Direct prerequisites"))
)]
pub async fn list_prerequisites(
    State(app): State<AppServices>,
    Path(id): Path<String>,
) -> ApiResult<Vec<course::Model>> {
    ok(app.prerequisites.list(&id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/prerequisites",
    tag = "Prerequisites",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    request_body = AddPrerequisiteRequest,
    responses(
        (status = 201, description = "Prerequisite added"),
        (status = 400, description = "Would create a cycle"),
        (status = 409, description = "Already a prerequisite")
    )
)]
pub async fn add_prerequisite(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<AddPrerequisiteRequest>,
) -> CreatedResult<course_prerequisite::Model> {
    created(app.prerequisites.add(&user.actor(), &id, &req.prerequisite_id).await?)
}

#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}/prerequisites/{prerequisite_id}",
    tag = "Prerequisites",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Course ID"),
        ("prerequisite_id" = String, Path, description = "Prerequisite course ID")
    ),
    responses((status = 200, description = "Prerequisite removed"))
)]
pub async fn remove_prerequisite(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((id, prerequisite_id)): Path<(String, String)>,
) -> ApiResult<EmptyData> {
    app.prerequisites.remove(&user.actor(), &id, &prerequisite_id).await?;
    ok(EmptyData {})
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/prerequisites/check",
    tag = "Prerequisites",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    responses((status = 200, description = "Which prerequisites the caller still lacks"))
)]
pub async fn check_prerequisites(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<PrerequisiteCheck> {
    ok(app.prerequisites.check(&user.user_id, &id).await?)
}
