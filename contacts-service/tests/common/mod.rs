//! In-process test harness: the real router over an in-memory store and
//! a recording mailer, driven through `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use contacts_service::config::{
    AvatarConfig, ContactsConfig, Environment, JwtConfig, MongoConfig, SecurityConfig, SmtpConfig,
};
use contacts_service::services::{
    AuthService, FormatValidatingProcessor, JwtService, LocalStorage, MemoryStore,
    MockEmailService,
};
use contacts_service::{build_router, AppState};
use service_core::config::Config;

pub struct TestApp {
    router: Router,
    pub email: Arc<MockEmailService>,
    avatar_dir: std::path::PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.avatar_dir);
    }
}

pub fn spawn_app() -> TestApp {
    let config = test_config();
    let avatar_dir = std::path::PathBuf::from(&config.avatar.storage_path);

    let store = Arc::new(MemoryStore::new());
    let email = Arc::new(MockEmailService::new());
    let jwt = JwtService::new(&config.jwt);
    let auth = AuthService::new(
        store.clone(),
        email.clone(),
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

    TestApp {
        router: build_router(state),
        email,
        avatar_dir,
    }
}

fn test_config() -> ContactsConfig {
    ContactsConfig {
        common: Config {
            port: 0,
            log_level: "error".to_string(),
        },
        environment: Environment::Prod,
        service_name: "contacts-service".to_string(),
        service_version: "test".to_string(),
        base_url: "http://localhost:8080".to_string(),
        mongodb: MongoConfig {
            uri: "mongodb://unused".to_string(),
            database: "unused".to_string(),
        },
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            session_expiry_hours: 23,
        },
        smtp: SmtpConfig {
            host: "smtp.unused".to_string(),
            user: String::new(),
            password: String::new(),
            from: "no-reply@localhost".to_string(),
        },
        avatar: AvatarConfig {
            storage_path: std::env::temp_dir()
                .join(format!("avatars-test-{}", uuid::Uuid::new_v4()))
                .to_string_lossy()
                .into_owned(),
            public_path: "/avatars".to_string(),
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn multipart_request(
        &self,
        uri: &str,
        token: &str,
        field: &str,
        file_name: &str,
        data: &[u8],
    ) -> (StatusCode, Value) {
        let boundary = "test-boundary-7MA4YWxkTrZu0gW";
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                field, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        let request = Request::builder()
            .method(Method::PATCH)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn register(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.request(
            Method::POST,
            "/api/users/register",
            None,
            Some(serde_json::json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Register, follow the verification link and log in; returns the
    /// session token.
    pub async fn register_verified(&self, email: &str, password: &str) -> String {
        let (status, _) = self.register(email, password).await;
        assert_eq!(status, StatusCode::CREATED);

        let token = self.email.sent_to(email).expect("verification mail sent");
        let (status, _) = self
            .request(
                Method::GET,
                &format!("/api/users/verify/{}", token),
                None,
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        self.login(email, password).await
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/users/login",
                None,
                Some(serde_json::json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().expect("token in response").to_string()
    }
}
