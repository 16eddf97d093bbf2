//! Tag catalog and course tagging

use axum::extract::{Path, Query, State};
use axum::Extension;

use super::dto::{AttachTagsRequest, CreateTagRequest, PopularTagsParams};
use crate::application::services::tags::TagWithCount;
use crate::application::AppServices;
use crate::infrastructure::database::entities::{course, tag};
use crate::interfaces::http::common::{created, ok, ApiResult, CreatedResult, EmptyData, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[utoipa::path(
    get,
    path = "/api/v1/tags",
    tag = "Tags",
    responses((status = 200, description = "All tags with course counts"))
)]
pub async fn list_tags(State(app): State<AppServices>) -> ApiResult<Vec<TagWithCount>> {
    ok(app.tags.list().await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/tags/popular",
    tag = "Tags",
    params(PopularTagsParams),
    responses((status = 200, description = "Most used tags first"))
)]
pub async fn popular_tags(
    State(app): State<AppServices>,
    Query(params): Query<PopularTagsParams>,
) -> ApiResult<Vec<TagWithCount>> {
    ok(app.tags.popular(params.limit.clamp(1, 100)).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/by-tag/{slug}",
    tag = "Tags",
    params(("slug" = String, Path, description = "Tag slug")),
    responses((status = 200, description = "Courses carrying the tag"))
)]
pub async fn courses_by_tag(
    State(app): State<AppServices>,
    Path(slug): Path<String>,
) -> ApiResult<Vec<course::Model>> {
    ok(app.tags.courses_by_tag(&slug).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/tags",
    tag = "Tags",
    security(("bearer_auth" = [])),
    request_body = CreateTagRequest,
    responses(
        (status = 201, description = "Tag created"),
        (status = 409, description = "Tag exists")
    )
)]
pub async fn create_tag(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(req): ValidatedJson<CreateTagRequest>,
) -> CreatedResult<tag::Model> {
    created(app.tags.create(&user.actor(), &req.name).await?)
}

#[utoipa::path(
    delete,
    path = "/api/v1/tags/{id}",
    tag = "Tags",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Tag ID")),
    responses((status = 200, description = "Tag deleted"))
)]
pub async fn delete_tag(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<EmptyData> {
    app.tags.delete(&user.actor(), &id).await?;
    ok(EmptyData {})
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/tags",
    tag = "Tags",
    params(("id" = String, Path, description = "Course ID")),
    responses((status = 200, description = "Tags of the course"))
)]
pub async fn course_tags(State(app): State<AppServices>, Path(id): Path<String>) -> ApiResult<Vec<tag::Model>> {
    ok(app.tags.course_tags(&id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/tags",
    tag = "Tags",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    request_body = AttachTagsRequest,
    responses((status = 200, description = "Tags now on the course"))
)]
pub async fn attach_tags(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<AttachTagsRequest>,
) -> ApiResult<Vec<tag::Model>> {
    ok(app.tags.attach(&user.actor(), &id, &req.names).await?)
}

#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}/tags/{tag_id}",
    tag = "Tags",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Course ID"),
        ("tag_id" = String, Path, description = "Tag ID")
    ),
    responses((status = 200, description = "Tag removed from the course"))
)]
pub async fn detach_tag(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((id, tag_id)): Path<(String, String)>,
) -> ApiResult<EmptyData> {
    app.tags.detach(&user.actor(), &id, &tag_id).await?;
    ok(EmptyData {})
}
