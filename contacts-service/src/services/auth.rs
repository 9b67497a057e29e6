//! Account lifecycle: registration, email verification, login sessions
//! and subscription changes. All handlers go through this service; there
//! is exactly one implementation of each flow.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::models::{Subscription, User, UserUpdate};
use crate::services::email::EmailProvider;
use crate::services::error::ServiceError;
use crate::services::jwt::JwtService;
use crate::services::store::Store;
use crate::utils::gravatar::gravatar_url;
use crate::utils::password::{hash_password, verify_password};
use crate::utils::token::generate_verification_token;
use service_core::error::AppError;

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    email: Arc<dyn EmailProvider>,
    jwt: JwtService,
    base_url: String,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn Store>,
        email: Arc<dyn EmailProvider>,
        jwt: JwtService,
        base_url: String,
    ) -> Self {
        Self {
            store,
            email,
            jwt,
            base_url,
        }
    }

    /// Create an unverified account and dispatch the verification mail.
    ///
    /// The user is committed before the mail goes out; a delivery failure
    /// is logged but does not undo registration, since resend exists as
    /// the recovery path.
    pub async fn register(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let password_hash = hash_password(password).map_err(ServiceError::Database)?;
        let token = generate_verification_token();
        let user = User::new(
            email.to_string(),
            password_hash,
            gravatar_url(email),
            token.clone(),
        );

        match self.store.insert_user(&user).await {
            Ok(()) => {}
            Err(AppError::Conflict(_)) => return Err(ServiceError::EmailInUse),
            Err(e) => return Err(ServiceError::Database(e)),
        }
        info!(user_id = %user.id, "user registered");

        if let Err(e) = self
            .email
            .send_verification_email(email, &token, &self.base_url)
            .await
        {
            error!(user_id = %user.id, error = %e, "verification email failed; resend available");
        }

        Ok(user)
    }

    /// Consume a verification token. Unknown tokens (including tokens
    /// already used) come back as not found.
    pub async fn verify_email(&self, token: &str) -> Result<User, ServiceError> {
        let user = self
            .store
            .verify_user_by_token(token)
            .await
            .map_err(ServiceError::Database)?
            .ok_or(ServiceError::UserNotFound)?;

        info!(user_id = %user.id, "email verified");
        Ok(user)
    }

    /// Re-send the verification mail for an unverified account. Unlike
    /// registration, a delivery failure here is an error the caller sees.
    pub async fn resend_verification(&self, email: &str) -> Result<(), ServiceError> {
        let user = self
            .store
            .find_user_by_email(email)
            .await
            .map_err(ServiceError::Database)?
            .ok_or(ServiceError::UserNotFound)?;

        if user.verified {
            return Err(ServiceError::AlreadyVerified);
        }

        let token = match user.verification_token {
            Some(token) => token,
            // Unverified users always hold a token; regenerate if the
            // record is somehow missing one.
            None => {
                let token = generate_verification_token();
                self.store
                    .update_user(
                        &user.id,
                        UserUpdate {
                            verification_token: Some(Some(token.clone())),
                            ..UserUpdate::default()
                        },
                    )
                    .await
                    .map_err(ServiceError::Database)?;
                warn!(user_id = %user.id, "regenerated missing verification token");
                token
            }
        };

        self.email
            .send_verification_email(email, &token, &self.base_url)
            .await
            .map_err(|e| ServiceError::EmailError(e.to_string()))?;

        Ok(())
    }

    /// Authenticate and open a session. The issued token is persisted on
    /// the user so logout and re-login can revoke it.
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, User), ServiceError> {
        let user = self
            .store
            .find_user_by_email(email)
            .await
            .map_err(ServiceError::Database)?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash) {
            return Err(ServiceError::InvalidCredentials);
        }

        if !user.verified {
            return Err(ServiceError::EmailNotVerified);
        }

        let token = self.jwt.issue(&user.id).map_err(ServiceError::Database)?;

        let user = self
            .store
            .update_user(&user.id, UserUpdate::session_token(Some(token.clone())))
            .await
            .map_err(ServiceError::Database)?
            .ok_or(ServiceError::UserNotFound)?;

        info!(user_id = %user.id, "session opened");
        Ok((token, user))
    }

    /// Close the current session by clearing the stored token.
    pub async fn logout(&self, user_id: &str) -> Result<(), ServiceError> {
        self.store
            .update_user(user_id, UserUpdate::session_token(None))
            .await
            .map_err(ServiceError::Database)?
            .ok_or(ServiceError::UserNotFound)?;

        info!(user_id, "session closed");
        Ok(())
    }

    pub async fn update_subscription(
        &self,
        user_id: &str,
        tier: Subscription,
    ) -> Result<User, ServiceError> {
        self.store
            .update_user(user_id, UserUpdate::subscription(tier))
            .await
            .map_err(ServiceError::Database)?
            .ok_or(ServiceError::UserNotFound)
    }

    pub async fn update_avatar(&self, user_id: &str, url: String) -> Result<User, ServiceError> {
        self.store
            .update_user(user_id, UserUpdate::avatar_url(url))
            .await
            .map_err(ServiceError::Database)?
            .ok_or(ServiceError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use crate::services::email::MockEmailService;
    use crate::services::store::{MemoryStore, UserStore};

    fn auth_with(email: Arc<MockEmailService>) -> (AuthService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let jwt = JwtService::new(&JwtConfig {
            secret: "test-secret-0123456789".to_string(),
            session_expiry_hours: 23,
        });
        let auth = AuthService::new(
            store.clone(),
            email,
            jwt,
            "http://localhost:8080".to_string(),
        );
        (auth, store)
    }

    fn auth() -> (AuthService, Arc<MemoryStore>, Arc<MockEmailService>) {
        let email = Arc::new(MockEmailService::new());
        let (auth, store) = auth_with(email.clone());
        (auth, store, email)
    }

    #[tokio::test]
    async fn register_creates_unverified_user_and_sends_mail() {
        let (auth, _, email) = auth();
        let user = auth.register("a@x.com", "secret1").await.unwrap();

        assert!(!user.verified);
        assert_eq!(user.subscription, Subscription::Starter);
        assert!(user.avatar_url.contains("gravatar.com"));

        let token = email.sent_to("a@x.com").unwrap();
        assert_eq!(token, user.verification_token.unwrap());
    }

    #[tokio::test]
    async fn register_survives_mail_failure() {
        let email = Arc::new(MockEmailService::failing());
        let (auth, store) = auth_with(email);

        let user = auth.register("a@x.com", "secret1").await.unwrap();
        // Account exists despite the failed dispatch
        assert!(store.find_user_by_id(&user.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn duplicate_registration_is_a_conflict() {
        let (auth, _, _) = auth();
        auth.register("a@x.com", "secret1").await.unwrap();

        let err = auth.register("a@x.com", "other-password").await.unwrap_err();
        assert!(matches!(err, ServiceError::EmailInUse));
    }

    #[tokio::test]
    async fn verification_token_is_single_use() {
        let (auth, _, email) = auth();
        auth.register("a@x.com", "secret1").await.unwrap();
        let token = email.sent_to("a@x.com").unwrap();

        let user = auth.verify_email(&token).await.unwrap();
        assert!(user.verified);
        assert!(user.verification_token.is_none());

        let err = auth.verify_email(&token).await.unwrap_err();
        assert!(matches!(err, ServiceError::UserNotFound));
    }

    #[tokio::test]
    async fn login_requires_verification() {
        let (auth, _, email) = auth();
        auth.register("a@x.com", "secret1").await.unwrap();

        let err = auth.login("a@x.com", "secret1").await.unwrap_err();
        assert!(matches!(err, ServiceError::EmailNotVerified));

        let token = email.sent_to("a@x.com").unwrap();
        auth.verify_email(&token).await.unwrap();

        let (jwt, user) = auth.login("a@x.com", "secret1").await.unwrap();
        assert_eq!(user.session_token.as_deref(), Some(jwt.as_str()));
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let (auth, _, email) = auth();
        auth.register("a@x.com", "secret1").await.unwrap();
        let token = email.sent_to("a@x.com").unwrap();
        auth.verify_email(&token).await.unwrap();

        let unknown = auth.login("b@x.com", "secret1").await.unwrap_err();
        let wrong = auth.login("a@x.com", "wrong").await.unwrap_err();
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn logout_clears_the_session_token() {
        let (auth, store, email) = auth();
        auth.register("a@x.com", "secret1").await.unwrap();
        let token = email.sent_to("a@x.com").unwrap();
        let user = auth.verify_email(&token).await.unwrap();
        auth.login("a@x.com", "secret1").await.unwrap();

        auth.logout(&user.id).await.unwrap();
        let stored = store.find_user_by_id(&user.id).await.unwrap().unwrap();
        assert!(stored.session_token.is_none());
    }

    #[tokio::test]
    async fn relogin_replaces_the_stored_session() {
        let (auth, store, email) = auth();
        auth.register("a@x.com", "secret1").await.unwrap();
        let token = email.sent_to("a@x.com").unwrap();
        let user = auth.verify_email(&token).await.unwrap();

        let (first, _) = auth.login("a@x.com", "secret1").await.unwrap();
        let (second, _) = auth.login("a@x.com", "secret1").await.unwrap();

        let stored = store.find_user_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.session_token.as_deref(), Some(second.as_str()));
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn resend_rejects_verified_accounts() {
        let (auth, _, email) = auth();
        auth.register("a@x.com", "secret1").await.unwrap();
        let token = email.sent_to("a@x.com").unwrap();
        auth.verify_email(&token).await.unwrap();

        let err = auth.resend_verification("a@x.com").await.unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyVerified));
    }

    #[tokio::test]
    async fn resend_reuses_the_pending_token() {
        let (auth, _, email) = auth();
        auth.register("a@x.com", "secret1").await.unwrap();
        let first = email.sent_to("a@x.com").unwrap();

        auth.resend_verification("a@x.com").await.unwrap();
        let sends = email.sent.lock().unwrap();
        assert_eq!(sends.len(), 2);
        assert_eq!(sends[1].1, first);
    }

    #[tokio::test]
    async fn subscription_update_persists() {
        let (auth, _, email) = auth();
        auth.register("a@x.com", "secret1").await.unwrap();
        let token = email.sent_to("a@x.com").unwrap();
        let user = auth.verify_email(&token).await.unwrap();

        let updated = auth
            .update_subscription(&user.id, Subscription::Business)
            .await
            .unwrap();
        assert_eq!(updated.subscription, Subscription::Business);
    }
}
