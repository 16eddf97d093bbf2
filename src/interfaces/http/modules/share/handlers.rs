//! Trackable course share links

use axum::extract::{Path, State};
use axum::Extension;

use super::dto::CreateShareRequest;
use crate::application::services::share::{ShareResolution, ShareStats};
use crate::application::AppServices;
use crate::infrastructure::database::entities::share_link;
use crate::interfaces::http::common::{ok, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/share",
    tag = "Sharing",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    request_body = CreateShareRequest,
    responses((status = 200, description = "Share link; an existing link for the same channel is reused"))
)]
pub async fn create_share_link(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<CreateShareRequest>,
) -> ApiResult<share_link::Model> {
    ok(app.share.create(&user.actor(), &id, req.channel.as_deref()).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/share/{token}",
    tag = "Sharing",
    params(("token" = String, Path, description = "Share token")),
    responses(
        (status = 200, description = "Target course; the click is counted"),
        (status = 404, description = "Unknown token")
    )
)]
pub async fn resolve_share_link(
    State(app): State<AppServices>,
    Path(token): Path<String>,
) -> ApiResult<ShareResolution> {
    ok(app.share.resolve(&token).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/share/stats",
    tag = "Sharing",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    responses((status = 200, description = "Clicks per channel, for the course owner"))
)]
pub async fn share_stats(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<ShareStats> {
    ok(app.share.stats(&user.actor(), &id).await?)
}
