//! User model - account records owned by the credential store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Subscription tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Subscription {
    Starter,
    Pro,
    Business,
}

impl Subscription {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subscription::Starter => "starter",
            Subscription::Pro => "pro",
            Subscription::Business => "business",
        }
    }
}

impl Default for Subscription {
    fn default() -> Self {
        Subscription::Starter
    }
}

/// User entity as persisted in the `users` collection.
///
/// `verification_token` is present while `verified == false` and cleared
/// atomically when verification succeeds. `session_token` holds the JWT
/// issued at the most recent login; logout clears it, which is what makes
/// store-side revocation work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub subscription: Subscription,
    pub verified: bool,
    pub verification_token: Option<String>,
    pub session_token: Option<String>,
    pub avatar_url: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new unverified user on the starter tier.
    pub fn new(
        email: String,
        password_hash: String,
        avatar_url: String,
        verification_token: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email,
            password_hash,
            subscription: Subscription::default(),
            verified: false,
            verification_token: Some(verification_token),
            session_token: None,
            avatar_url,
            created_at: Utc::now(),
        }
    }

    /// Convert to the public view (no hash, no tokens).
    pub fn sanitized(&self) -> PublicUser {
        PublicUser {
            email: self.email.clone(),
            subscription: self.subscription,
            avatar_url: self.avatar_url.clone(),
        }
    }
}

/// Subset of user fields safe to return to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicUser {
    #[schema(example = "user@example.com")]
    pub email: String,
    pub subscription: Subscription,
    #[schema(example = "https://gravatar.com/avatar/abc123?s=200&r=pg&d=mm")]
    pub avatar_url: String,
}

/// Typed partial update applied through `UserStore::update_user`.
///
/// `None` leaves a field untouched; `Some(None)` on the token fields
/// clears them.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub verified: Option<bool>,
    pub verification_token: Option<Option<String>>,
    pub session_token: Option<Option<String>>,
    pub subscription: Option<Subscription>,
    pub avatar_url: Option<String>,
}

impl UserUpdate {
    pub fn session_token(token: Option<String>) -> Self {
        Self {
            session_token: Some(token),
            ..Self::default()
        }
    }

    pub fn subscription(tier: Subscription) -> Self {
        Self {
            subscription: Some(tier),
            ..Self::default()
        }
    }

    pub fn avatar_url(url: String) -> Self {
        Self {
            avatar_url: Some(url),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.verified.is_none()
            && self.verification_token.is_none()
            && self.session_token.is_none()
            && self.subscription.is_none()
            && self.avatar_url.is_none()
    }
}
