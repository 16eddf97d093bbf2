use axum::extract::State;
use axum::Extension;

use crate::application::services::referral::ReferralStats;
use crate::application::AppServices;
use crate::infrastructure::database::entities::referral_code;
use crate::interfaces::http::common::{ok, ApiResult};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[utoipa::path(
    get,
    path = "/api/v1/referrals/code",
    tag = "Referrals",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Caller's referral code, created on first use"))
)]
pub async fn my_referral_code(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<referral_code::Model> {
    ok(app.referral.get_or_create_code(&user.user_id).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/referrals/stats",
    tag = "Referrals",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Referred users and earned rewards"))
)]
pub async fn referral_stats(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<ReferralStats> {
    ok(app.referral.stats(&user.user_id).await?)
}
