//! Signup and email verification endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use service_core::error::AppError;

use crate::dtos::auth::{RegisterRequest, RegisterResponse, ResendVerificationRequest};
use crate::dtos::{ErrorResponse, MessageResponse};
use crate::utils::validation::ValidatedJson;
use crate::AppState;

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let user = state.auth.register(&req.email, &req.password).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: user.sanitized(),
        }),
    ))
}

/// Confirm an email address with a token from the verification link.
#[utoipa::path(
    get,
    path = "/api/users/verify/{token}",
    params(("token" = String, Path, description = "Verification token")),
    responses(
        (status = 200, description = "Email verified", body = MessageResponse),
        (status = 404, description = "Unknown or already-used token", body = ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.auth.verify_email(&token).await?;
    Ok(Json(MessageResponse {
        message: "Verification successful".to_string(),
    }))
}

/// Re-send the verification mail for an unverified account.
#[utoipa::path(
    post,
    path = "/api/users/verify",
    request_body = ResendVerificationRequest,
    responses(
        (status = 200, description = "Verification email sent", body = MessageResponse),
        (status = 400, description = "Account already verified", body = ErrorResponse),
        (status = 404, description = "No account for this email", body = ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn resend_verification(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ResendVerificationRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state.auth.resend_verification(&req.email).await?;
    Ok(Json(MessageResponse {
        message: "Verification email sent".to_string(),
    }))
}
