//! Registration, login and the current-user endpoint

use axum::{extract::State, Extension};

use super::dto::{LoginRequest, LoginResponse, RegisterRequest, UserDto};
use crate::application::services::users::Registration;
use crate::application::AppServices;
use crate::domain::UserRole;
use crate::interfaces::http::common::{
    created, ok, parse_enum, ApiResponse, ApiResult, CreatedResult, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::shared::best_effort;

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<UserDto>),
        (status = 409, description = "Email or username already taken"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn register(
    State(app): State<AppServices>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> CreatedResult<UserDto> {
    let role = match req.role.as_deref() {
        Some(raw) => parse_enum::<UserRole>(raw)?,
        None => UserRole::Student,
    };
    let user = app
        .users
        .register(Registration {
            email: req.email,
            username: req.username,
            password: req.password,
            role,
        })
        .await?;

    if let Some(code) = req.referral_code.as_deref() {
        best_effort("register_referral", app.referral.register_referral(code, &user.id)).await;
    }
    created(UserDto::from(user))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials or disabled account")
    )
)]
pub async fn login(
    State(app): State<AppServices>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let auth = app.users.login(&req.login, &req.password).await?;
    ok(LoginResponse {
        token: auth.token,
        token_type: auth.token_type,
        expires_in: auth.expires_in,
        user: auth.user.into(),
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserDto>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn me(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<UserDto> {
    ok(app.users.get(&user.user_id).await?.into())
}
