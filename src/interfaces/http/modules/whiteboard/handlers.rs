//! Shared whiteboards with an ordered action log

use axum::extract::{Path, Query, State};
use axum::Extension;
use serde::Serialize;
use utoipa::ToSchema;

use super::dto::{AppendActionRequest, CreateWhiteboardRequest, LockRequest, SinceParams};
use crate::application::AppServices;
use crate::infrastructure::database::entities::{whiteboard, whiteboard_action};
use crate::interfaces::http::common::{created, ok, ApiResult, CreatedResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Debug, Serialize, ToSchema)]
pub struct ClearedBoard {
    pub whiteboard_id: String,
    pub removed_actions: u64,
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/whiteboards",
    tag = "Whiteboards",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    responses((status = 200, description = "Course whiteboards"))
)]
pub async fn list_whiteboards(
    State(app): State<AppServices>,
    Path(id): Path<String>,
) -> ApiResult<Vec<whiteboard::Model>> {
    ok(app.whiteboard.list_for_course(&id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/whiteboards",
    tag = "Whiteboards",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    request_body = CreateWhiteboardRequest,
    responses((status = 201, description = "Whiteboard created"))
)]
pub async fn create_whiteboard(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<CreateWhiteboardRequest>,
) -> CreatedResult<whiteboard::Model> {
    created(app.whiteboard.create(&user.actor(), &id, &req.title).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/whiteboards/{board_id}",
    tag = "Whiteboards",
    security(("bearer_auth" = [])),
    params(("board_id" = String, Path, description = "Whiteboard ID")),
    responses((status = 200, description = "Whiteboard"))
)]
pub async fn get_whiteboard(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(board_id): Path<String>,
) -> ApiResult<whiteboard::Model> {
    ok(app.whiteboard.get(&user.actor(), &board_id).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/whiteboards/{board_id}/actions",
    tag = "Whiteboards",
    security(("bearer_auth" = [])),
    params(("board_id" = String, Path, description = "Whiteboard ID"), SinceParams),
    responses((status = 200, description = "Actions after the given sequence number, in order"))
)]
pub async fn list_actions(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(board_id): Path<String>,
    Query(since): Query<SinceParams>,
) -> ApiResult<Vec<whiteboard_action::Model>> {
    ok(app.whiteboard.actions_since(&user.actor(), &board_id, since.after).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/whiteboards/{board_id}/actions",
    tag = "Whiteboards",
    security(("bearer_auth" = [])),
    params(("board_id" = String, Path, description = "Whiteboard ID")),
    request_body = AppendActionRequest,
    responses(
        (status = 201, description = "Action appended with the next sequence number"),
        (status = 403, description = "Board is locked")
    )
)]
pub async fn append_action(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(board_id): Path<String>,
    ValidatedJson(req): ValidatedJson<AppendActionRequest>,
) -> CreatedResult<whiteboard_action::Model> {
    created(
        app.whiteboard
            .append_action(&user.actor(), &board_id, &req.kind, req.payload)
            .await?,
    )
}

#[utoipa::path(
    delete,
    path = "/api/v1/whiteboards/{board_id}/actions",
    tag = "Whiteboards",
    security(("bearer_auth" = [])),
    params(("board_id" = String, Path, description = "Whiteboard ID")),
    responses((status = 200, description = "All actions removed", body = ClearedBoard))
)]
pub async fn clear_whiteboard(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(board_id): Path<String>,
) -> ApiResult<ClearedBoard> {
    let removed_actions = app.whiteboard.clear(&user.actor(), &board_id).await?;
    ok(ClearedBoard {
        whiteboard_id: board_id,
        removed_actions,
    })
}

#[utoipa::path(
    put,
    path = "/api/v1/whiteboards/{board_id}/lock",
    tag = "Whiteboards",
    security(("bearer_auth" = [])),
    params(("board_id" = String, Path, description = "Whiteboard ID")),
    request_body = LockRequest,
    responses((status = 200, description = "Lock state changed"))
)]
pub async fn set_locked(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(board_id): Path<String>,
    ValidatedJson(req): ValidatedJson<LockRequest>,
) -> ApiResult<whiteboard::Model> {
    ok(app.whiteboard.set_locked(&user.actor(), &board_id, req.locked).await?)
}
