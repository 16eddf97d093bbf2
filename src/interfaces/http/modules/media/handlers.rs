//! Files in object storage, hosted video and live streams

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::Extension;
use validator::Validate;

use super::dto::{LiveStreamRequest, UploadParams, VideoUploadRequest};
use crate::application::services::media::{LiveStream, Playback, VideoUploadTicket};
use crate::application::AppServices;
use crate::infrastructure::database::entities::media_asset;
use crate::interfaces::http::common::{created, ok, ApiError, ApiResult, CreatedResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[utoipa::path(
    post,
    path = "/api/v1/media/files",
    tag = "Media",
    security(("bearer_auth" = [])),
    params(UploadParams),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "File stored and READY"),
        (status = 400, description = "Empty or oversized body"),
        (status = 502, description = "Object storage rejected the upload")
    )
)]
pub async fn upload_file(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<UploadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> CreatedResult<media_asset::Model> {
    params
        .validate()
        .map_err(|e| ApiError::bad_request(format!("Invalid upload parameters: {}", e)))?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string();
    created(
        app.media
            .upload_file(&user.actor(), params.course_id, &params.file_name, &content_type, body.to_vec())
            .await?,
    )
}

#[utoipa::path(
    post,
    path = "/api/v1/media/videos",
    tag = "Media",
    security(("bearer_auth" = [])),
    request_body = VideoUploadRequest,
    responses(
        (status = 201, description = "Direct upload URL for the video provider"),
        (status = 502, description = "Video provider unavailable")
    )
)]
pub async fn request_video_upload(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(req): ValidatedJson<VideoUploadRequest>,
) -> CreatedResult<VideoUploadTicket> {
    created(app.media.request_video_upload(&user.actor(), req.course_id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/media/{asset_id}/refresh",
    tag = "Media",
    security(("bearer_auth" = [])),
    params(("asset_id" = String, Path, description = "Asset ID")),
    responses((status = 200, description = "Status re-read from the video provider"))
)]
pub async fn refresh_video_status(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(asset_id): Path<String>,
) -> ApiResult<media_asset::Model> {
    ok(app.media.refresh_video_status(&user.actor(), &asset_id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/live",
    tag = "Media",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    request_body = LiveStreamRequest,
    responses((status = 201, description = "Live input with ingest URL and stream key"))
)]
pub async fn start_live_stream(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<LiveStreamRequest>,
) -> CreatedResult<LiveStream> {
    created(app.media.start_live_stream(&user.actor(), &id, &req.name).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/media/{asset_id}/playback",
    tag = "Media",
    security(("bearer_auth" = [])),
    params(("asset_id" = String, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Playback or download URL; null while processing"),
        (status = 404, description = "Unknown or deleted asset")
    )
)]
pub async fn get_playback(State(app): State<AppServices>, Path(asset_id): Path<String>) -> ApiResult<Playback> {
    ok(app.media.get_playback(&asset_id).await?)
}

#[utoipa::path(
    delete,
    path = "/api/v1/media/{asset_id}",
    tag = "Media",
    security(("bearer_auth" = [])),
    params(("asset_id" = String, Path, description = "Asset ID")),
    responses((status = 200, description = "Asset marked DELETED and removed from the provider"))
)]
pub async fn delete_asset(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(asset_id): Path<String>,
) -> ApiResult<media_asset::Model> {
    ok(app.media.delete_asset(&user.actor(), &asset_id).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/media",
    tag = "Media",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    responses((status = 200, description = "Course assets that are not deleted"))
)]
pub async fn list_course_media(
    State(app): State<AppServices>,
    Path(id): Path<String>,
) -> ApiResult<Vec<media_asset::Model>> {
    ok(app.media.list_for_course(&id).await?)
}
