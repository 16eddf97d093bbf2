use axum::extract::{Path, Query, State};
use axum::Extension;

use super::dto::{CreateCouponRequest, ValidateCouponParams};
use crate::application::AppServices;
use crate::domain::coupon::DiscountQuote;
use crate::infrastructure::database::entities::coupon;
use crate::interfaces::http::common::{created, ok, ApiResult, CreatedResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[utoipa::path(
    get,
    path = "/api/v1/coupons",
    tag = "Coupons",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All coupons for admins, own coupons for teachers"))
)]
pub async fn list_coupons(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<coupon::Model>> {
    ok(app.coupons.list(&user.actor()).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/coupons",
    tag = "Coupons",
    security(("bearer_auth" = [])),
    request_body = CreateCouponRequest,
    responses(
        (status = 201, description = "Coupon created"),
        (status = 409, description = "Code already in use")
    )
)]
pub async fn create_coupon(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(req): ValidatedJson<CreateCouponRequest>,
) -> CreatedResult<coupon::Model> {
    let input = req.into_new_coupon()?;
    created(app.coupons.create(&user.actor(), input).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/coupons/{coupon_id}/deactivate",
    tag = "Coupons",
    security(("bearer_auth" = [])),
    params(("coupon_id" = String, Path, description = "Coupon ID")),
    responses((status = 200, description = "Coupon deactivated"))
)]
pub async fn deactivate_coupon(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(coupon_id): Path<String>,
) -> ApiResult<coupon::Model> {
    ok(app.coupons.deactivate(&user.actor(), &coupon_id).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/coupons/validate",
    tag = "Coupons",
    security(("bearer_auth" = [])),
    params(ValidateCouponParams),
    responses(
        (status = 200, description = "Discount the coupon would give"),
        (status = 400, description = "Expired, exhausted or not applicable")
    )
)]
pub async fn validate_coupon(
    State(app): State<AppServices>,
    Query(params): Query<ValidateCouponParams>,
) -> ApiResult<DiscountQuote> {
    ok(app
        .coupons
        .validate(&params.code, params.course_id.as_deref(), params.amount_cents)
        .await?)
}
