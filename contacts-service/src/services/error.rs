use service_core::error::AppError;
use thiserror::Error;

/// Domain failures for the auth and contacts flows.
///
/// `InvalidCredentials` deliberately covers both unknown email and wrong
/// password so responses never reveal which one it was.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(AppError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("Email in use")]
    EmailInUse,

    #[error("Email or password is wrong")]
    InvalidCredentials,

    #[error("Email not verified")]
    EmailNotVerified,

    #[error("Verification has already been passed")]
    AlreadyVerified,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Contact not found")]
    ContactNotFound,

    #[error("Email error: {0}")]
    EmailError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Database(e) => e,
            ServiceError::Internal(e) => AppError::InternalError(e),
            ServiceError::EmailInUse => AppError::Conflict(anyhow::anyhow!("Email in use")),
            ServiceError::InvalidCredentials => {
                AppError::Unauthorized(anyhow::anyhow!("Email or password is wrong"))
            }
            ServiceError::EmailNotVerified => {
                AppError::Unauthorized(anyhow::anyhow!("Email not verified"))
            }
            ServiceError::AlreadyVerified => {
                AppError::BadRequest(anyhow::anyhow!("Verification has already been passed"))
            }
            ServiceError::UserNotFound => AppError::NotFound(anyhow::anyhow!("User not found")),
            ServiceError::InvalidToken => {
                AppError::Unauthorized(anyhow::anyhow!("Invalid or expired token"))
            }
            ServiceError::ContactNotFound => {
                AppError::NotFound(anyhow::anyhow!("Contact not found"))
            }
            ServiceError::EmailError(e) => AppError::EmailError(e),
            ServiceError::ValidationError(e) => AppError::BadRequest(anyhow::anyhow!(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    fn status_of(err: ServiceError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn domain_errors_map_to_expected_statuses() {
        assert_eq!(status_of(ServiceError::EmailInUse), StatusCode::CONFLICT);
        assert_eq!(
            status_of(ServiceError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(ServiceError::EmailNotVerified),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(ServiceError::AlreadyVerified),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(ServiceError::UserNotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(ServiceError::InvalidToken),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn credential_failures_share_one_message() {
        // User-enumeration guard: unknown email and wrong password must be
        // indistinguishable to the client.
        let a = ServiceError::InvalidCredentials.to_string();
        assert_eq!(a, "Email or password is wrong");
    }
}
