//! Bookmarks, timestamped notes and resume positions for lesson videos

use axum::extract::{Path, State};
use axum::Extension;

use super::dto::{BookmarkRequest, NoteRequest, UpdateNoteRequest, WatchProgressRequest};
use crate::application::services::video_features::ProgressUpdate;
use crate::application::AppServices;
use crate::infrastructure::database::entities::{video_bookmark, video_note, watch_progress};
use crate::interfaces::http::common::{created, ok, ApiResult, CreatedResult, EmptyData, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[utoipa::path(
    get,
    path = "/api/v1/lessons/{lesson_id}/bookmarks",
    tag = "Video",
    security(("bearer_auth" = [])),
    params(("lesson_id" = String, Path, description = "Lesson ID")),
    responses((status = 200, description = "Caller's bookmarks by position"))
)]
pub async fn list_bookmarks(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(lesson_id): Path<String>,
) -> ApiResult<Vec<video_bookmark::Model>> {
    ok(app.video_features.list_bookmarks(&user.user_id, &lesson_id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/lessons/{lesson_id}/bookmarks",
    tag = "Video",
    security(("bearer_auth" = [])),
    params(("lesson_id" = String, Path, description = "Lesson ID")),
    request_body = BookmarkRequest,
    responses(
        (status = 201, description = "Bookmark added"),
        (status = 403, description = "No access to the lesson")
    )
)]
pub async fn add_bookmark(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(lesson_id): Path<String>,
    ValidatedJson(req): ValidatedJson<BookmarkRequest>,
) -> CreatedResult<video_bookmark::Model> {
    created(
        app.video_features
            .add_bookmark(&user.actor(), &lesson_id, req.position_seconds, req.label)
            .await?,
    )
}

#[utoipa::path(
    delete,
    path = "/api/v1/bookmarks/{bookmark_id}",
    tag = "Video",
    security(("bearer_auth" = [])),
    params(("bookmark_id" = String, Path, description = "Bookmark ID")),
    responses((status = 200, description = "Bookmark deleted"))
)]
pub async fn delete_bookmark(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(bookmark_id): Path<String>,
) -> ApiResult<EmptyData> {
    app.video_features.delete_bookmark(&user.actor(), &bookmark_id).await?;
    ok(EmptyData {})
}

#[utoipa::path(
    get,
    path = "/api/v1/lessons/{lesson_id}/notes",
    tag = "Video",
    security(("bearer_auth" = [])),
    params(("lesson_id" = String, Path, description = "Lesson ID")),
    responses((status = 200, description = "Caller's notes by position"))
)]
pub async fn list_notes(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(lesson_id): Path<String>,
) -> ApiResult<Vec<video_note::Model>> {
    ok(app.video_features.list_notes(&user.user_id, &lesson_id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/lessons/{lesson_id}/notes",
    tag = "Video",
    security(("bearer_auth" = [])),
    params(("lesson_id" = String, Path, description = "Lesson ID")),
    request_body = NoteRequest,
    responses((status = 201, description = "Note added"))
)]
pub async fn add_note(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(lesson_id): Path<String>,
    ValidatedJson(req): ValidatedJson<NoteRequest>,
) -> CreatedResult<video_note::Model> {
    created(
        app.video_features
            .add_note(&user.actor(), &lesson_id, req.position_seconds, &req.body)
            .await?,
    )
}

#[utoipa::path(
    put,
    path = "/api/v1/notes/{note_id}",
    tag = "Video",
    security(("bearer_auth" = [])),
    params(("note_id" = String, Path, description = "Note ID")),
    request_body = UpdateNoteRequest,
    responses((status = 200, description = "Note updated"))
)]
pub async fn update_note(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(note_id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateNoteRequest>,
) -> ApiResult<video_note::Model> {
    ok(app.video_features.update_note(&user.actor(), &note_id, &req.body).await?)
}

#[utoipa::path(
    delete,
    path = "/api/v1/notes/{note_id}",
    tag = "Video",
    security(("bearer_auth" = [])),
    params(("note_id" = String, Path, description = "Note ID")),
    responses((status = 200, description = "Note deleted"))
)]
pub async fn delete_note(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(note_id): Path<String>,
) -> ApiResult<EmptyData> {
    app.video_features.delete_note(&user.actor(), &note_id).await?;
    ok(EmptyData {})
}

#[utoipa::path(
    put,
    path = "/api/v1/lessons/{lesson_id}/watch-progress",
    tag = "Video",
    security(("bearer_auth" = [])),
    params(("lesson_id" = String, Path, description = "Lesson ID")),
    request_body = WatchProgressRequest,
    responses((status = 200, description = "Position saved; includes course progress when the lesson completed"))
)]
pub async fn save_watch_progress(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(lesson_id): Path<String>,
    ValidatedJson(req): ValidatedJson<WatchProgressRequest>,
) -> ApiResult<ProgressUpdate> {
    ok(app
        .video_features
        .save_progress(&user.actor(), &lesson_id, req.position_seconds, req.duration_seconds)
        .await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/lessons/{lesson_id}/watch-progress",
    tag = "Video",
    security(("bearer_auth" = [])),
    params(("lesson_id" = String, Path, description = "Lesson ID")),
    responses((status = 200, description = "Last saved position, or null"))
)]
pub async fn get_watch_progress(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(lesson_id): Path<String>,
) -> ApiResult<Option<watch_progress::Model>> {
    ok(app.video_features.get_progress(&user.user_id, &lesson_id).await?)
}
