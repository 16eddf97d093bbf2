use axum::extract::State;
use axum::Extension;

use super::dto::SubscribeRequest;
use crate::application::AppServices;
use crate::infrastructure::database::entities::subscription;
use crate::interfaces::http::common::{ok, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[utoipa::path(
    get,
    path = "/api/v1/subscriptions/me",
    tag = "Subscriptions",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Active subscription, or null"))
)]
pub async fn my_subscription(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Option<subscription::Model>> {
    ok(app.monetization.active_subscription(&user.user_id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/subscriptions",
    tag = "Subscriptions",
    security(("bearer_auth" = [])),
    request_body = SubscribeRequest,
    responses((status = 200, description = "Subscription started or extended by one period"))
)]
pub async fn subscribe(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(req): ValidatedJson<SubscribeRequest>,
) -> ApiResult<subscription::Model> {
    ok(app.monetization.subscribe(&user.user_id, &req.plan).await?)
}

#[utoipa::path(
    delete,
    path = "/api/v1/subscriptions/me",
    tag = "Subscriptions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Subscription cancelled; access runs to the period end"),
        (status = 404, description = "No active subscription")
    )
)]
pub async fn cancel_subscription(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<subscription::Model> {
    ok(app.monetization.cancel_subscription(&user.user_id).await?)
}
