//! Payments for courses, bundles and single lessons

use axum::extract::{Path, State};
use axum::Extension;

use super::dto::{CompletePaymentRequest, CreatePaymentRequest, LessonPurchaseRequest};
use crate::application::AppServices;
use crate::infrastructure::database::entities::payment;
use crate::interfaces::http::common::{created, ok, ApiResult, CreatedResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[utoipa::path(
    post,
    path = "/api/v1/payments",
    tag = "Payments",
    security(("bearer_auth" = [])),
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "PENDING payment with any coupon discount applied"),
        (status = 400, description = "Coupon not applicable")
    )
)]
pub async fn create_payment(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(req): ValidatedJson<CreatePaymentRequest>,
) -> CreatedResult<payment::Model> {
    let target = req.target()?;
    created(
        app.payments
            .create(&user.actor(), target, req.coupon_code.as_deref())
            .await?,
    )
}

#[utoipa::path(
    get,
    path = "/api/v1/payments/me",
    tag = "Payments",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Caller's payments, newest first"))
)]
pub async fn my_payments(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<payment::Model>> {
    ok(app.payments.list_for_user(&user.user_id).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/payments/{payment_id}",
    tag = "Payments",
    security(("bearer_auth" = [])),
    params(("payment_id" = String, Path, description = "Payment ID")),
    responses((status = 200, description = "Payment"))
)]
pub async fn get_payment(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(payment_id): Path<String>,
) -> ApiResult<payment::Model> {
    ok(app.payments.get(&user.actor(), &payment_id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/{payment_id}/complete",
    tag = "Payments",
    security(("bearer_auth" = [])),
    params(("payment_id" = String, Path, description = "Payment ID")),
    request_body = CompletePaymentRequest,
    responses(
        (status = 200, description = "Payment COMPLETED; repeating is a no-op"),
        (status = 400, description = "Payment already failed or refunded")
    )
)]
pub async fn complete_payment(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(payment_id): Path<String>,
    ValidatedJson(req): ValidatedJson<CompletePaymentRequest>,
) -> ApiResult<payment::Model> {
    ok(app
        .payments
        .complete(&user.actor(), &payment_id, req.provider_ref)
        .await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/{payment_id}/fail",
    tag = "Payments",
    security(("bearer_auth" = [])),
    params(("payment_id" = String, Path, description = "Payment ID")),
    responses((status = 200, description = "Payment FAILED"))
)]
pub async fn fail_payment(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(payment_id): Path<String>,
) -> ApiResult<payment::Model> {
    ok(app.payments.fail(&user.actor(), &payment_id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/{payment_id}/refund",
    tag = "Payments",
    security(("bearer_auth" = [])),
    params(("payment_id" = String, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment REFUNDED"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn refund_payment(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(payment_id): Path<String>,
) -> ApiResult<payment::Model> {
    ok(app.payments.refund(&user.actor(), &payment_id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/lessons/{lesson_id}/purchase",
    tag = "Payments",
    security(("bearer_auth" = [])),
    params(("lesson_id" = String, Path, description = "Lesson ID")),
    request_body = LessonPurchaseRequest,
    responses(
        (status = 201, description = "Lesson purchased"),
        (status = 400, description = "Lesson is not sold separately"),
        (status = 409, description = "Lesson already owned")
    )
)]
pub async fn purchase_lesson(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(lesson_id): Path<String>,
    ValidatedJson(req): ValidatedJson<LessonPurchaseRequest>,
) -> CreatedResult<payment::Model> {
    created(
        app.lesson_payment
            .purchase_lesson(&user.actor(), &lesson_id, req.coupon_code.as_deref())
            .await?,
    )
}
