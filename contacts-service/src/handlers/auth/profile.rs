//! Profile changes for authenticated users: subscription tier and avatar.

use axum::extract::{Multipart, State};
use axum::Json;
use service_core::error::AppError;
use tracing::info;

use crate::dtos::auth::{AvatarResponse, CurrentUserResponse, UpdateSubscriptionRequest};
use crate::dtos::ErrorResponse;
use crate::middleware::AuthUser;
use crate::utils::validation::ValidatedJson;
use crate::AppState;

/// Change the subscription tier.
#[utoipa::path(
    patch,
    path = "/api/users",
    request_body = UpdateSubscriptionRequest,
    responses(
        (status = 200, description = "Subscription updated", body = CurrentUserResponse),
        (status = 400, description = "Unknown tier", body = ErrorResponse),
        (status = 401, description = "Not authorized", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn update_subscription(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateSubscriptionRequest>,
) -> Result<Json<CurrentUserResponse>, AppError> {
    let user = state
        .auth
        .update_subscription(&user.id, req.subscription)
        .await?;
    Ok(Json(CurrentUserResponse {
        email: user.email,
        subscription: user.subscription,
    }))
}

/// Replace the avatar with an uploaded image.
///
/// The upload is validated and processed in full before anything is
/// written to storage or the user record, so a bad image leaves both
/// untouched.
#[utoipa::path(
    patch,
    path = "/api/users/avatars",
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Avatar updated", body = AvatarResponse),
        (status = 400, description = "Missing or invalid image", body = ErrorResponse),
        (status = 401, description = "Not authorized", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn update_avatar(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<AvatarResponse>, AppError> {
    let mut data = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!(e.to_string())))?
    {
        if field.name() == Some("avatar") {
            data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(anyhow::anyhow!(e.to_string())))?,
            );
            break;
        }
    }

    let data =
        data.ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Missing avatar file field")))?;

    let (processed, format) = state.processor.process(&data).await?;
    let file_name = format!("{}.{}", user.id, format.extension());
    let url = state.avatars.upload(&file_name, &processed).await?;
    let user = state.auth.update_avatar(&user.id, url.clone()).await?;

    info!(user_id = %user.id, "avatar updated");
    Ok(Json(AvatarResponse { avatar_url: url }))
}
