//! Bearer-token gate for protected routes.
//!
//! A request passes only if the token decodes, the subject still exists,
//! and the token equals the session token stored on the user. The last
//! check is what invalidates tokens after logout or a newer login, even
//! while their signature is still valid.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use service_core::error::AppError;

use crate::models::User;
use crate::AppState;

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok()))
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Not authorized")))?
        .to_string();

    let claims = state.jwt.verify(&token)?;

    let user = state
        .store
        .find_user_by_id(&claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Not authorized")))?;

    if user.session_token.as_deref() != Some(token.as_str()) {
        return Err(AppError::Unauthorized(anyhow::anyhow!("Not authorized")));
    }

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

fn bearer_token(header: Option<&str>) -> Option<&str> {
    let header = header?;
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

/// The authenticated user, populated by `auth_middleware`.
pub struct AuthUser(pub User);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Not authorized")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_extraction_handles_edge_cases() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(Some("Bearer ")), None);
        assert_eq!(bearer_token(Some("Basic abc")), None);
        assert_eq!(bearer_token(Some("abc.def.ghi")), None);
        assert_eq!(bearer_token(None), None);
    }
}
