//! Admin-only user management

use axum::extract::{Path, Query, State};
use axum::Extension;

use super::dto::{ListUsersParams, SetActiveRequest, SetRoleRequest};
use crate::application::AppServices;
use crate::domain::UserRole;
use crate::interfaces::http::common::{ok, parse_enum, ApiResponse, ApiResult, PaginatedResponse, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::modules::auth::UserDto;
use crate::shared::pagination::PaginationParams;

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(ListUsersParams),
    responses(
        (status = 200, description = "User list", body = ApiResponse<PaginatedResponse<UserDto>>),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_users(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<ListUsersParams>,
) -> ApiResult<PaginatedResponse<UserDto>> {
    let role = params.role.as_deref().map(parse_enum::<UserRole>).transpose()?;
    let page = app
        .users
        .list(&user.actor(), role, PaginationParams::new(params.page, params.limit))
        .await?;
    ok(page.map(UserDto::from).into())
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/role",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    request_body = SetRoleRequest,
    responses(
        (status = 200, description = "Role changed", body = ApiResponse<UserDto>),
        (status = 404, description = "User not found")
    )
)]
pub async fn set_role(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<SetRoleRequest>,
) -> ApiResult<UserDto> {
    let role = parse_enum::<UserRole>(&req.role)?;
    ok(app.users.set_role(&user.actor(), &id, role).await?.into())
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/active",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    request_body = SetActiveRequest,
    responses(
        (status = 200, description = "Account enabled or disabled", body = ApiResponse<UserDto>),
        (status = 404, description = "User not found")
    )
)]
pub async fn set_active(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<SetActiveRequest>,
) -> ApiResult<UserDto> {
    ok(app.users.set_active(&user.actor(), &id, req.is_active).await?.into())
}
