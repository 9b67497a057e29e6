//! Login, logout and current-user endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use service_core::error::AppError;

use crate::dtos::auth::{CurrentUserResponse, LoginRequest, LoginResponse};
use crate::dtos::ErrorResponse;
use crate::middleware::AuthUser;
use crate::utils::validation::ValidatedJson;
use crate::AppState;

/// Open a session for a verified account.
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session opened", body = LoginResponse),
        (status = 401, description = "Bad credentials or unverified email", body = ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (token, user) = state.auth.login(&req.email, &req.password).await?;
    Ok(Json(LoginResponse {
        token,
        user: CurrentUserResponse {
            email: user.email,
            subscription: user.subscription,
        },
    }))
}

/// Close the current session.
#[utoipa::path(
    post,
    path = "/api/users/logout",
    responses(
        (status = 204, description = "Session closed"),
        (status = 401, description = "Not authorized", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<StatusCode, AppError> {
    state.auth.logout(&user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Return the authenticated user's profile.
#[utoipa::path(
    get,
    path = "/api/users/current",
    responses(
        (status = 200, description = "Current user", body = CurrentUserResponse),
        (status = 401, description = "Not authorized", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn current(AuthUser(user): AuthUser) -> Json<CurrentUserResponse> {
    Json(CurrentUserResponse {
        email: user.email,
        subscription: user.subscription,
    })
}
