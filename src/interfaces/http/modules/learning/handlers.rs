//! Lesson completion, course progress and learning paths

use axum::extract::{Path, State};
use axum::Extension;

use super::dto::{AddPathCourseRequest, CompleteLessonRequest, CreatePathRequest};
use crate::application::services::learning::{CourseProgress, PathDetails};
use crate::application::AppServices;
use crate::infrastructure::database::entities::{learning_path, learning_path_course};
use crate::interfaces::http::common::{created, ok, ApiResult, CreatedResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[utoipa::path(
    post,
    path = "/api/v1/lessons/{lesson_id}/complete",
    tag = "Learning",
    security(("bearer_auth" = [])),
    params(("lesson_id" = String, Path, description = "Lesson ID")),
    request_body = CompleteLessonRequest,
    responses(
        (status = 200, description = "Updated course progress"),
        (status = 403, description = "Not enrolled in the course")
    )
)]
pub async fn complete_lesson(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(lesson_id): Path<String>,
    ValidatedJson(req): ValidatedJson<CompleteLessonRequest>,
) -> ApiResult<CourseProgress> {
    ok(app
        .learning
        .complete_lesson(&user.user_id, &lesson_id, req.time_spent_seconds)
        .await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/progress",
    tag = "Learning",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    responses((status = 200, description = "Completed lessons of the caller in the course"))
)]
pub async fn course_progress(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<CourseProgress> {
    ok(app.learning.course_progress(&user.user_id, &id).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/learning-paths",
    tag = "Learning",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All learning paths"))
)]
pub async fn list_paths(State(app): State<AppServices>) -> ApiResult<Vec<learning_path::Model>> {
    ok(app.learning.list_paths().await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/learning-paths",
    tag = "Learning",
    security(("bearer_auth" = [])),
    request_body = CreatePathRequest,
    responses(
        (status = 201, description = "Path created"),
        (status = 403, description = "Teacher role required")
    )
)]
pub async fn create_path(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(req): ValidatedJson<CreatePathRequest>,
) -> CreatedResult<learning_path::Model> {
    created(app.learning.create_path(&user.actor(), &req.title, req.description).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/learning-paths/{path_id}",
    tag = "Learning",
    security(("bearer_auth" = [])),
    params(("path_id" = String, Path, description = "Learning path ID")),
    responses((status = 200, description = "Ordered courses with the caller's completion"))
)]
pub async fn get_path(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(path_id): Path<String>,
) -> ApiResult<PathDetails> {
    ok(app.learning.get_path(&path_id, &user.user_id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/learning-paths/{path_id}/courses",
    tag = "Learning",
    security(("bearer_auth" = [])),
    params(("path_id" = String, Path, description = "Learning path ID")),
    request_body = AddPathCourseRequest,
    responses(
        (status = 201, description = "Course appended to the path"),
        (status = 409, description = "Course already on the path")
    )
)]
pub async fn add_path_course(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(path_id): Path<String>,
    ValidatedJson(req): ValidatedJson<AddPathCourseRequest>,
) -> CreatedResult<learning_path_course::Model> {
    created(
        app.learning
            .add_course_to_path(&user.actor(), &path_id, &req.course_id)
            .await?,
    )
}
