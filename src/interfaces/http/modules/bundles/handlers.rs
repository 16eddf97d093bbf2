//! Discounted multi-course bundles

use axum::extract::{Path, State};
use axum::Extension;

use super::dto::{BundleCourseRequest, CreateBundleRequest, PurchaseBundleRequest};
use crate::application::services::bundles::{BundleDetails, BundlePurchase};
use crate::application::AppServices;
use crate::interfaces::http::common::{created, ok, ApiResult, CreatedResult, EmptyData, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[utoipa::path(
    get,
    path = "/api/v1/bundles",
    tag = "Bundles",
    responses((status = 200, description = "Active bundles with pricing"))
)]
pub async fn list_bundles(State(app): State<AppServices>) -> ApiResult<Vec<BundleDetails>> {
    ok(app.bundles.list().await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/bundles/{bundle_id}",
    tag = "Bundles",
    params(("bundle_id" = String, Path, description = "Bundle ID")),
    responses((status = 200, description = "Bundle with courses and pricing"))
)]
pub async fn get_bundle(State(app): State<AppServices>, Path(bundle_id): Path<String>) -> ApiResult<BundleDetails> {
    ok(app.bundles.get(&bundle_id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/bundles",
    tag = "Bundles",
    security(("bearer_auth" = [])),
    request_body = CreateBundleRequest,
    responses(
        (status = 201, description = "Bundle created"),
        (status = 403, description = "Courses must belong to the caller")
    )
)]
pub async fn create_bundle(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(req): ValidatedJson<CreateBundleRequest>,
) -> CreatedResult<BundleDetails> {
    created(app.bundles.create(&user.actor(), req.into()).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/bundles/{bundle_id}/courses",
    tag = "Bundles",
    security(("bearer_auth" = [])),
    params(("bundle_id" = String, Path, description = "Bundle ID")),
    request_body = BundleCourseRequest,
    responses((status = 200, description = "Bundle with the course added"))
)]
pub async fn add_bundle_course(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(bundle_id): Path<String>,
    ValidatedJson(req): ValidatedJson<BundleCourseRequest>,
) -> ApiResult<BundleDetails> {
    ok(app.bundles.add_course(&user.actor(), &bundle_id, &req.course_id).await?)
}

#[utoipa::path(
    delete,
    path = "/api/v1/bundles/{bundle_id}/courses/{course_id}",
    tag = "Bundles",
    security(("bearer_auth" = [])),
    params(
        ("bundle_id" = String, Path, description = "Bundle ID"),
        ("course_id" = String, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Bundle with the course removed"),
        (status = 400, description = "Would leave fewer than two courses")
    )
)]
pub async fn remove_bundle_course(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((bundle_id, course_id)): Path<(String, String)>,
) -> ApiResult<BundleDetails> {
    ok(app.bundles.remove_course(&user.actor(), &bundle_id, &course_id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/bundles/{bundle_id}/purchase",
    tag = "Bundles",
    security(("bearer_auth" = [])),
    params(("bundle_id" = String, Path, description = "Bundle ID")),
    request_body = PurchaseBundleRequest,
    responses((status = 201, description = "Completed payment and one enrollment per course"))
)]
pub async fn purchase_bundle(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(bundle_id): Path<String>,
    ValidatedJson(req): ValidatedJson<PurchaseBundleRequest>,
) -> CreatedResult<BundlePurchase> {
    created(
        app.bundles
            .purchase(&user.actor(), &bundle_id, req.coupon_code.as_deref())
            .await?,
    )
}

#[utoipa::path(
    delete,
    path = "/api/v1/bundles/{bundle_id}",
    tag = "Bundles",
    security(("bearer_auth" = [])),
    params(("bundle_id" = String, Path, description = "Bundle ID")),
    responses((status = 200, description = "Bundle deleted"))
)]
pub async fn delete_bundle(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(bundle_id): Path<String>,
) -> ApiResult<EmptyData> {
    app.bundles.delete(&user.actor(), &bundle_id).await?;
    ok(EmptyData {})
}
