//! Verification mail delivery over SMTP.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use service_core::error::AppError;
use std::sync::Mutex;
use tracing::info;

use crate::config::SmtpConfig;

/// Outbound mail seam. The SMTP implementation is swapped for a recording
/// double in tests.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send_verification_email(
        &self,
        to: &str,
        token: &str,
        base_url: &str,
    ) -> Result<(), AppError>;
}

pub struct EmailService {
    transport: SmtpTransport,
    from: String,
}

impl EmailService {
    pub fn new(config: &SmtpConfig) -> Result<Self, AppError> {
        let transport = SmtpTransport::relay(&config.host)
            .map_err(|e| AppError::EmailError(e.to_string()))?
            .credentials(Credentials::new(
                config.user.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from: config.from.clone(),
        })
    }

    fn build_message(&self, to: &str, token: &str, base_url: &str) -> Result<Message, AppError> {
        let link = format!("{}/api/users/verify/{}", base_url, token);
        let body = format!(
            "Welcome!\n\nPlease confirm your email address by opening the link below:\n\n{}\n\n\
             If you did not create an account, you can ignore this message.\n",
            link
        );

        Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| AppError::EmailError(format!("invalid from address: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| AppError::EmailError(format!("invalid recipient: {}", e)))?)
            .subject("Verify your email")
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(Into::into)
    }
}

#[async_trait]
impl EmailProvider for EmailService {
    async fn send_verification_email(
        &self,
        to: &str,
        token: &str,
        base_url: &str,
    ) -> Result<(), AppError> {
        let message = self.build_message(to, token, base_url)?;
        let transport = self.transport.clone();

        // lettre's SmtpTransport is blocking
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| AppError::EmailError(e.to_string()))?
            .map_err(|e| AppError::EmailError(e.to_string()))?;

        info!(recipient = to, "verification email sent");
        Ok(())
    }
}

/// Test double that records every send instead of talking to SMTP.
#[derive(Default)]
pub struct MockEmailService {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: bool,
}

impl MockEmailService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent_to(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .expect("sent lock poisoned")
            .iter()
            .find(|(to, _)| to == email)
            .map(|(_, token)| token.clone())
    }
}

#[async_trait]
impl EmailProvider for MockEmailService {
    async fn send_verification_email(
        &self,
        to: &str,
        token: &str,
        _base_url: &str,
    ) -> Result<(), AppError> {
        if self.fail {
            return Err(AppError::EmailError("smtp unavailable".to_string()));
        }
        self.sent
            .lock()
            .expect("sent lock poisoned")
            .push((to.to_string(), token.to_string()));
        Ok(())
    }
}
