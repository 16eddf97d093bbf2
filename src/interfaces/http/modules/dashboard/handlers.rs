use axum::extract::State;
use axum::Extension;

use crate::application::services::dashboard::{AdminOverview, StudentDashboard, TeacherDashboard};
use crate::application::AppServices;
use crate::interfaces::http::common::{ok, ApiResult};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/student",
    tag = "Dashboard",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Enrollments, certificates and upcoming events"))
)]
pub async fn student_dashboard(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<StudentDashboard> {
    ok(app.dashboard.student_dashboard(&user.actor()).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/teacher",
    tag = "Dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Courses, students, revenue and pending work"),
        (status = 403, description = "Teacher role required")
    )
)]
pub async fn teacher_dashboard(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<TeacherDashboard> {
    ok(app.dashboard.teacher_dashboard(&user.actor()).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/admin",
    tag = "Dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Platform totals"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn admin_overview(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<AdminOverview> {
    ok(app.dashboard.admin_overview(&user.actor()).await?)
}
