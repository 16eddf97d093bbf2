//! Assignments, submissions and grading

use axum::extract::{Path, State};
use axum::Extension;

use super::dto::{CreateAssignmentRequest, GradeRequest, SubmitWorkRequest};
use crate::application::AppServices;
use crate::infrastructure::database::entities::{assignment, submission};
use crate::interfaces::http::common::{created, ok, ApiResult, CreatedResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/assignments",
    tag = "Assignments",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    request_body = CreateAssignmentRequest,
    responses((status = 201, description = "Assignment created"))
)]
pub async fn create_assignment(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<CreateAssignmentRequest>,
) -> CreatedResult<assignment::Model> {
    created(app.assignments.create(&user.actor(), &id, req.into()).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/assignments",
    tag = "Assignments",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    responses((status = 200, description = "Assignments by due date"))
)]
pub async fn list_assignments(
    State(app): State<AppServices>,
    Path(id): Path<String>,
) -> ApiResult<Vec<assignment::Model>> {
    ok(app.assignments.list_for_course(&id).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/assignments/{assignment_id}",
    tag = "Assignments",
    security(("bearer_auth" = [])),
    params(("assignment_id" = String, Path, description = "Assignment ID")),
    responses((status = 200, description = "Assignment"))
)]
pub async fn get_assignment(
    State(app): State<AppServices>,
    Path(assignment_id): Path<String>,
) -> ApiResult<assignment::Model> {
    ok(app.assignments.get(&assignment_id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/assignments/{assignment_id}/submissions",
    tag = "Assignments",
    security(("bearer_auth" = [])),
    params(("assignment_id" = String, Path, description = "Assignment ID")),
    request_body = SubmitWorkRequest,
    responses(
        (status = 200, description = "Work submitted or resubmitted"),
        (status = 409, description = "Submission has already been graded")
    )
)]
pub async fn submit_work(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(assignment_id): Path<String>,
    ValidatedJson(req): ValidatedJson<SubmitWorkRequest>,
) -> ApiResult<submission::Model> {
    ok(app.assignments.submit(&user.actor(), &assignment_id, req.into()).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/assignments/{assignment_id}/submissions",
    tag = "Assignments",
    security(("bearer_auth" = [])),
    params(("assignment_id" = String, Path, description = "Assignment ID")),
    responses((status = 200, description = "Submissions visible to the caller"))
)]
pub async fn list_submissions(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(assignment_id): Path<String>,
) -> ApiResult<Vec<submission::Model>> {
    ok(app.assignments.list_submissions(&user.actor(), &assignment_id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/submissions/{submission_id}/grade",
    tag = "Assignments",
    security(("bearer_auth" = [])),
    params(("submission_id" = String, Path, description = "Submission ID")),
    request_body = GradeRequest,
    responses(
        (status = 200, description = "Submission graded or returned"),
        (status = 400, description = "Points exceed the maximum")
    )
)]
pub async fn grade_submission(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(submission_id): Path<String>,
    ValidatedJson(req): ValidatedJson<GradeRequest>,
) -> ApiResult<submission::Model> {
    ok(app.assignments.grade(&user.actor(), &submission_id, req.into()).await?)
}
