use axum::extract::State;
use axum::Extension;

use crate::application::services::recommendation::Recommended;
use crate::application::AppServices;
use crate::interfaces::http::common::{ok, ApiResult};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[utoipa::path(
    get,
    path = "/api/v1/recommendations",
    tag = "Recommendations",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Last computed recommendations, best first"))
)]
pub async fn stored_recommendations(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<Recommended>> {
    ok(app.recommendation.stored(&user.user_id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/recommendations/refresh",
    tag = "Recommendations",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Freshly scored recommendations; replaces the stored set"))
)]
pub async fn refresh_recommendations(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<Recommended>> {
    ok(app.recommendation.recommend(&user.user_id).await?)
}
