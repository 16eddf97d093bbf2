//! Course discussion forum

use axum::extract::{Path, State};
use axum::Extension;

use super::dto::{CreatePostRequest, PinRequest, ReplyRequest};
use crate::application::services::forum::PostWithReplies;
use crate::application::AppServices;
use crate::infrastructure::database::entities::{forum_post, forum_reply};
use crate::interfaces::http::common::{created, ok, ApiResult, CreatedResult, EmptyData, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/forum",
    tag = "Forum",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    responses((status = 200, description = "Posts, pinned first then newest"))
)]
pub async fn list_posts(
    State(app): State<AppServices>,
    Path(id): Path<String>,
) -> ApiResult<Vec<forum_post::Model>> {
    ok(app.forum.list_posts(&id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/forum",
    tag = "Forum",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created"),
        (status = 403, description = "Not a course participant")
    )
)]
pub async fn create_post(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<CreatePostRequest>,
) -> CreatedResult<forum_post::Model> {
    created(app.forum.create_post(&user.actor(), &id, &req.title, &req.body).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/forum/posts/{post_id}",
    tag = "Forum",
    security(("bearer_auth" = [])),
    params(("post_id" = String, Path, description = "Post ID")),
    responses((status = 200, description = "Post with its replies"))
)]
pub async fn get_post(State(app): State<AppServices>, Path(post_id): Path<String>) -> ApiResult<PostWithReplies> {
    ok(app.forum.get_post(&post_id).await?)
}

#[utoipa::path(
    delete,
    path = "/api/v1/forum/posts/{post_id}",
    tag = "Forum",
    security(("bearer_auth" = [])),
    params(("post_id" = String, Path, description = "Post ID")),
    responses((status = 200, description = "Post and its replies deleted"))
)]
pub async fn delete_post(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(post_id): Path<String>,
) -> ApiResult<EmptyData> {
    app.forum.delete_post(&user.actor(), &post_id).await?;
    ok(EmptyData {})
}

#[utoipa::path(
    post,
    path = "/api/v1/forum/posts/{post_id}/replies",
    tag = "Forum",
    security(("bearer_auth" = [])),
    params(("post_id" = String, Path, description = "Post ID")),
    request_body = ReplyRequest,
    responses((status = 201, description = "Reply added"))
)]
pub async fn reply(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(post_id): Path<String>,
    ValidatedJson(req): ValidatedJson<ReplyRequest>,
) -> CreatedResult<forum_reply::Model> {
    created(app.forum.reply(&user.actor(), &post_id, &req.body).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/forum/posts/{post_id}/upvote",
    tag = "Forum",
    security(("bearer_auth" = [])),
    params(("post_id" = String, Path, description = "Post ID")),
    responses((status = 200, description = "Post with the new vote count"))
)]
pub async fn upvote_post(
    State(app): State<AppServices>,
    Path(post_id): Path<String>,
) -> ApiResult<forum_post::Model> {
    ok(app.forum.upvote_post(&post_id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/forum/replies/{reply_id}/upvote",
    tag = "Forum",
    security(("bearer_auth" = [])),
    params(("reply_id" = String, Path, description = "Reply ID")),
    responses((status = 200, description = "Reply with the new vote count"))
)]
pub async fn upvote_reply(
    State(app): State<AppServices>,
    Path(reply_id): Path<String>,
) -> ApiResult<forum_reply::Model> {
    ok(app.forum.upvote_reply(&reply_id).await?)
}

#[utoipa::path(
    delete,
    path = "/api/v1/forum/replies/{reply_id}",
    tag = "Forum",
    security(("bearer_auth" = [])),
    params(("reply_id" = String, Path, description = "Reply ID")),
    responses((status = 200, description = "Reply deleted"))
)]
pub async fn delete_reply(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(reply_id): Path<String>,
) -> ApiResult<EmptyData> {
    app.forum.delete_reply(&user.actor(), &reply_id).await?;
    ok(EmptyData {})
}

#[utoipa::path(
    post,
    path = "/api/v1/forum/posts/{post_id}/best-answer/{reply_id}",
    tag = "Forum",
    security(("bearer_auth" = [])),
    params(
        ("post_id" = String, Path, description = "Post ID"),
        ("reply_id" = String, Path, description = "Reply ID")
    ),
    responses(
        (status = 200, description = "Reply marked; any previous best answer is unmarked"),
        (status = 403, description = "Only the post author or course teacher")
    )
)]
pub async fn mark_best_answer(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((post_id, reply_id)): Path<(String, String)>,
) -> ApiResult<PostWithReplies> {
    ok(app.forum.mark_best_answer(&user.actor(), &post_id, &reply_id).await?)
}

#[utoipa::path(
    put,
    path = "/api/v1/forum/posts/{post_id}/pin",
    tag = "Forum",
    security(("bearer_auth" = [])),
    params(("post_id" = String, Path, description = "Post ID")),
    request_body = PinRequest,
    responses((status = 200, description = "Pin state changed"))
)]
pub async fn set_pinned(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(post_id): Path<String>,
    ValidatedJson(req): ValidatedJson<PinRequest>,
) -> ApiResult<forum_post::Model> {
    ok(app.forum.set_pinned(&user.actor(), &post_id, req.pinned).await?)
}
