//! Background import of courses from external catalogs

use axum::extract::{Path, State};
use axum::Extension;

use super::dto::StartImportRequest;
use crate::application::AppServices;
use crate::domain::course_import::ImportProvider;
use crate::infrastructure::database::entities::import_job;
use crate::interfaces::http::common::{accepted, ok, parse_enum, ApiResult, CreatedResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[utoipa::path(
    get,
    path = "/api/v1/imports/providers",
    tag = "Imports",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Providers with a configured catalog client"))
)]
pub async fn list_providers(State(app): State<AppServices>) -> ApiResult<Vec<ImportProvider>> {
    ok(app.course_import.providers())
}

#[utoipa::path(
    post,
    path = "/api/v1/imports",
    tag = "Imports",
    security(("bearer_auth" = [])),
    request_body = StartImportRequest,
    responses(
        (status = 202, description = "Job queued as PENDING"),
        (status = 400, description = "Provider not configured")
    )
)]
pub async fn start_import(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(req): ValidatedJson<StartImportRequest>,
) -> CreatedResult<import_job::Model> {
    let provider = parse_enum::<ImportProvider>(&req.provider)?;
    accepted(
        app.course_import
            .start_import(&user.actor(), provider, &req.external_id)
            .await?,
    )
}

#[utoipa::path(
    get,
    path = "/api/v1/imports",
    tag = "Imports",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Caller's jobs; admins see all"))
)]
pub async fn list_imports(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<import_job::Model>> {
    ok(app.course_import.list(&user.actor()).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/imports/{job_id}",
    tag = "Imports",
    security(("bearer_auth" = [])),
    params(("job_id" = String, Path, description = "Import job ID")),
    responses((status = 200, description = "Job with status and resulting course id"))
)]
pub async fn get_import(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(job_id): Path<String>,
) -> ApiResult<import_job::Model> {
    ok(app.course_import.get(&user.actor(), &job_id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/imports/{job_id}/cancel",
    tag = "Imports",
    security(("bearer_auth" = [])),
    params(("job_id" = String, Path, description = "Import job ID")),
    responses(
        (status = 200, description = "Job CANCELLED"),
        (status = 400, description = "Job already finished")
    )
)]
pub async fn cancel_import(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(job_id): Path<String>,
) -> ApiResult<import_job::Model> {
    ok(app.course_import.cancel(&user.actor(), &job_id).await?)
}
