//! Teacher revenue share and activity-gated payouts

use axum::extract::{Path, Query, State};
use axum::Extension;
use chrono::Utc;

use super::dto::PeriodParams;
use crate::application::services::teacher_earnings::EarningsSummary;
use crate::application::AppServices;
use crate::domain::earnings::Payout;
use crate::infrastructure::database::entities::teacher_earning;
use crate::interfaces::http::common::{ok, ApiResult};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[utoipa::path(
    get,
    path = "/api/v1/teachers/{teacher_id}/earnings",
    tag = "Earnings",
    security(("bearer_auth" = [])),
    params(("teacher_id" = String, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Earning lines, newest first"),
        (status = 403, description = "Own earnings only unless admin")
    )
)]
pub async fn list_earnings(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(teacher_id): Path<String>,
) -> ApiResult<Vec<teacher_earning::Model>> {
    ok(app.earnings.list(&user.actor(), &teacher_id).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/teachers/{teacher_id}/earnings/summary",
    tag = "Earnings",
    security(("bearer_auth" = [])),
    params(("teacher_id" = String, Path, description = "Teacher ID"), PeriodParams),
    responses((status = 200, description = "Totals by status and source with the payout split"))
)]
pub async fn earnings_summary(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(teacher_id): Path<String>,
    Query(params): Query<PeriodParams>,
) -> ApiResult<EarningsSummary> {
    let period = params.resolve(Utc::now())?;
    ok(app.earnings.summary(&user.actor(), &teacher_id, period).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/teachers/{teacher_id}/payout",
    tag = "Earnings",
    security(("bearer_auth" = [])),
    params(("teacher_id" = String, Path, description = "Teacher ID"), PeriodParams),
    responses((status = 200, description = "Payable and withheld amounts for the period"))
)]
pub async fn preview_payout(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(teacher_id): Path<String>,
    Query(params): Query<PeriodParams>,
) -> ApiResult<Payout> {
    let period = params.resolve(Utc::now())?;
    ok(app.earnings.payout(&user.actor(), &teacher_id, period).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/teachers/{teacher_id}/payout",
    tag = "Earnings",
    security(("bearer_auth" = [])),
    params(("teacher_id" = String, Path, description = "Teacher ID"), PeriodParams),
    responses(
        (status = 200, description = "Payable earnings marked PAID"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn mark_period_paid(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(teacher_id): Path<String>,
    Query(params): Query<PeriodParams>,
) -> ApiResult<Payout> {
    let period = params.resolve(Utc::now())?;
    ok(app.earnings.mark_period_paid(&user.actor(), &teacher_id, period).await?)
}
