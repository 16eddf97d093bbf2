//! Course reviews and rating summaries

use axum::extract::{Path, Query, State};
use axum::Extension;

use super::dto::{CreateReviewRequest, ReviewReplyRequest, UpdateReviewRequest};
use crate::application::AppServices;
use crate::domain::review::RatingSummary;
use crate::infrastructure::database::entities::review;
use crate::interfaces::http::common::{
    created, ok, ApiResult, CreatedResult, EmptyData, PaginatedResponse, PaginationQuery, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/reviews",
    tag = "Reviews",
    params(("id" = String, Path, description = "Course ID"), PaginationQuery),
    responses((status = 200, description = "Newest reviews first"))
)]
pub async fn list_reviews(
    State(app): State<AppServices>,
    Path(id): Path<String>,
    Query(page): Query<PaginationQuery>,
) -> ApiResult<PaginatedResponse<review::Model>> {
    ok(app.reviews.list_for_course(&id, page.into()).await?.into())
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/reviews/summary",
    tag = "Reviews",
    params(("id" = String, Path, description = "Course ID")),
    responses((status = 200, description = "Average and star distribution"))
)]
pub async fn review_summary(State(app): State<AppServices>, Path(id): Path<String>) -> ApiResult<RatingSummary> {
    ok(app.reviews.summary(&id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/reviews",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review posted"),
        (status = 403, description = "Not enrolled"),
        (status = 409, description = "You have already reviewed this course")
    )
)]
pub async fn create_review(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<CreateReviewRequest>,
) -> CreatedResult<review::Model> {
    created(app.reviews.create(&user.actor(), &id, req.rating, req.comment).await?)
}

#[utoipa::path(
    put,
    path = "/api/v1/reviews/{review_id}",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    params(("review_id" = String, Path, description = "Review ID")),
    request_body = UpdateReviewRequest,
    responses((status = 200, description = "Review updated"))
)]
pub async fn update_review(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(review_id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateReviewRequest>,
) -> ApiResult<review::Model> {
    ok(app
        .reviews
        .update(&user.actor(), &review_id, req.rating, req.comment)
        .await?)
}

#[utoipa::path(
    delete,
    path = "/api/v1/reviews/{review_id}",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    params(("review_id" = String, Path, description = "Review ID")),
    responses((status = 200, description = "Review deleted"))
)]
pub async fn delete_review(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(review_id): Path<String>,
) -> ApiResult<EmptyData> {
    app.reviews.delete(&user.actor(), &review_id).await?;
    ok(EmptyData {})
}

#[utoipa::path(
    post,
    path = "/api/v1/reviews/{review_id}/reply",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    params(("review_id" = String, Path, description = "Review ID")),
    request_body = ReviewReplyRequest,
    responses(
        (status = 200, description = "Teacher reply stored"),
        (status = 403, description = "Only the course teacher replies")
    )
)]
pub async fn reply_to_review(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(review_id): Path<String>,
    ValidatedJson(req): ValidatedJson<ReviewReplyRequest>,
) -> ApiResult<review::Model> {
    ok(app.reviews.reply(&user.actor(), &review_id, &req.reply).await?)
}
