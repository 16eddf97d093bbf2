//! Enrollment lifecycle and course waitlists

use axum::extract::{Path, State};
use axum::Extension;

use super::dto::UpdateProgressRequest;
use crate::application::services::waitlist::WaitlistPosition;
use crate::application::AppServices;
use crate::infrastructure::database::entities::{enrollment, waitlist_entry};
use crate::interfaces::http::common::{created, ok, ApiResult, CreatedResult, EmptyData, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/enroll",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    responses(
        (status = 201, description = "Enrolled"),
        (status = 400, description = "Course not published, full or prerequisites missing"),
        (status = 403, description = "Payment or subscription required"),
        (status = 409, description = "Already enrolled")
    )
)]
pub async fn enroll(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> CreatedResult<enrollment::Model> {
    created(app.enrollment.enroll(&user.actor(), &id).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/enrollments/me",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "The caller's enrollments"))
)]
pub async fn my_enrollments(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<enrollment::Model>> {
    ok(app.enrollment.list_for_student(&user.user_id).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/enrollments/{id}",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Enrollment ID")),
    responses(
        (status = 200, description = "Enrollment"),
        (status = 403, description = "Neither the student nor the course teacher")
    )
)]
pub async fn get_enrollment(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<enrollment::Model> {
    ok(app.enrollment.get(&user.actor(), &id).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/enrollments",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    responses((status = 200, description = "Enrollments of the course"))
)]
pub async fn course_enrollments(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Vec<enrollment::Model>> {
    ok(app.enrollment.list_for_course(&user.actor(), &id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/enrollments/{id}/cancel",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Enrollment ID")),
    responses(
        (status = 200, description = "Enrollment cancelled; the next waitlisted student is notified"),
        (status = 400, description = "Enrollment is not active")
    )
)]
pub async fn cancel_enrollment(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<enrollment::Model> {
    ok(app.enrollment.cancel(&user.actor(), &id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/enrollments/{id}/complete",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Enrollment ID")),
    responses((status = 200, description = "Enrollment completed"))
)]
pub async fn complete_enrollment(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<enrollment::Model> {
    ok(app.enrollment.complete(&user.actor(), &id).await?)
}

#[utoipa::path(
    put,
    path = "/api/v1/enrollments/{id}/progress",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Enrollment ID")),
    request_body = UpdateProgressRequest,
    responses((status = 200, description = "Progress stored; 100 completes the enrollment"))
)]
pub async fn update_progress(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateProgressRequest>,
) -> ApiResult<enrollment::Model> {
    ok(app
        .enrollment
        .update_progress(&user.actor(), &id, req.progress_percent)
        .await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/waitlist",
    tag = "Waitlist",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    responses(
        (status = 201, description = "Joined the waitlist"),
        (status = 409, description = "Already waiting or enrolled")
    )
)]
pub async fn join_waitlist(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> CreatedResult<waitlist_entry::Model> {
    created(app.waitlist.join(&user.actor(), &id).await?)
}

#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}/waitlist",
    tag = "Waitlist",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    responses((status = 200, description = "Left the waitlist"))
)]
pub async fn leave_waitlist(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<EmptyData> {
    app.waitlist.leave(&user.actor(), &id).await?;
    ok(EmptyData {})
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/waitlist/position",
    tag = "Waitlist",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    responses((status = 200, description = "1-based queue position of the caller"))
)]
pub async fn waitlist_position(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<WaitlistPosition> {
    ok(app.waitlist.position(&user.actor(), &id).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/waitlist",
    tag = "Waitlist",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    responses((status = 200, description = "Queue in join order, for the course teacher"))
)]
pub async fn list_waitlist(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Vec<waitlist_entry::Model>> {
    ok(app.waitlist.list(&user.actor(), &id).await?)
}
