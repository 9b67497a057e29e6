//! Application assembly and lifecycle.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ContactsConfig;
use crate::services::{
    AuthService, EmailService, FormatValidatingProcessor, JwtService, LocalStorage, MongoDb,
};
use crate::AppState;
use service_core::error::AppError;

pub struct Application {
    listener: TcpListener,
    router: axum::Router,
    port: u16,
}

impl Application {
    /// Wire up every collaborator from configuration: the Mongo store
    /// (with indexes), SMTP mailer, JWT signer and avatar storage.
    pub async fn build(config: ContactsConfig) -> Result<Self, AppError> {
        let store = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database).await?;
        store.initialize_indexes().await?;

        let jwt = JwtService::new(&config.jwt);
        let email = Arc::new(EmailService::new(&config.smtp)?);
        let store = Arc::new(store);
        let auth = AuthService::new(
            store.clone(),
            email,
            jwt.clone(),
            config.base_url.clone(),
        );

        let state = AppState {
            avatars: Arc::new(LocalStorage::new(
                &config.avatar.storage_path,
                config.avatar.public_path.clone(),
            )),
            processor: Arc::new(FormatValidatingProcessor),
            config: Arc::new(config),
            store,
            auth,
            jwt,
        };

        let port = state.config.common.port;
        let listener = TcpListener::bind(("0.0.0.0", port)).await?;
        let port = listener.local_addr()?.port();
        let router = crate::build_router(state);

        Ok(Self {
            listener,
            router,
            port,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), AppError> {
        info!(port = self.port, "listening");
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
