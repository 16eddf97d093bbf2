use axum::extract::{Query, State};

use super::dto::CompareParams;
use crate::application::services::comparison::Comparison;
use crate::application::AppServices;
use crate::interfaces::http::common::{ok, ApiResult};

#[utoipa::path(
    get,
    path = "/api/v1/courses/compare",
    tag = "Courses",
    params(CompareParams),
    responses(
        (status = 200, description = "Side-by-side rows in the requested order with highlights"),
        (status = 400, description = "Fewer than 2 or more than 4 courses")
    )
)]
pub async fn compare_courses(
    State(app): State<AppServices>,
    Query(params): Query<CompareParams>,
) -> ApiResult<Comparison> {
    ok(app.comparison.compare(&params.course_ids()).await?)
}
