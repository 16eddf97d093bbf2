//! Calendar events for courses and users

use axum::extract::{Path, Query, State};
use axum::Extension;
use chrono::Utc;

use super::dto::{CreateEventRequest, RangeParams, UpcomingParams, UpdateEventRequest};
use crate::application::AppServices;
use crate::infrastructure::database::entities::calendar_event;
use crate::interfaces::http::common::{created, ok, ApiResult, CreatedResult, EmptyData, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[utoipa::path(
    get,
    path = "/api/v1/calendar",
    tag = "Calendar",
    security(("bearer_auth" = [])),
    params(RangeParams),
    responses(
        (status = 200, description = "Events overlapping the range, by start time"),
        (status = 400, description = "Range end before start")
    )
)]
pub async fn list_events(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(range): Query<RangeParams>,
) -> ApiResult<Vec<calendar_event::Model>> {
    let (from, to) = range.resolve(Utc::now());
    ok(app.calendar.list_for_user(&user.user_id, from, to).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/calendar/upcoming",
    tag = "Calendar",
    security(("bearer_auth" = [])),
    params(UpcomingParams),
    responses((status = 200, description = "Next events that have not ended"))
)]
pub async fn upcoming_events(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<UpcomingParams>,
) -> ApiResult<Vec<calendar_event::Model>> {
    ok(app.calendar.upcoming(&user.user_id, params.limit.clamp(1, 50)).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/calendar",
    tag = "Calendar",
    security(("bearer_auth" = [])),
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created"),
        (status = 403, description = "Course events need the course teacher")
    )
)]
pub async fn create_event(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(req): ValidatedJson<CreateEventRequest>,
) -> CreatedResult<calendar_event::Model> {
    let input = req.into_new_event()?;
    created(app.calendar.create(&user.actor(), input).await?)
}

#[utoipa::path(
    put,
    path = "/api/v1/calendar/{event_id}",
    tag = "Calendar",
    security(("bearer_auth" = [])),
    params(("event_id" = String, Path, description = "Event ID")),
    request_body = UpdateEventRequest,
    responses((status = 200, description = "Event updated"))
)]
pub async fn update_event(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(event_id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateEventRequest>,
) -> ApiResult<calendar_event::Model> {
    ok(app.calendar.update(&user.actor(), &event_id, req.into()).await?)
}

#[utoipa::path(
    delete,
    path = "/api/v1/calendar/{event_id}",
    tag = "Calendar",
    security(("bearer_auth" = [])),
    params(("event_id" = String, Path, description = "Event ID")),
    responses((status = 200, description = "Event deleted"))
)]
pub async fn delete_event(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(event_id): Path<String>,
) -> ApiResult<EmptyData> {
    app.calendar.delete(&user.actor(), &event_id).await?;
    ok(EmptyData {})
}
