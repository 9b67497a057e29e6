pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, patch, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{ContactsConfig, Environment};
use crate::services::{AuthService, ImageProcessor, JwtService, Storage, Store};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ContactsConfig>,
    pub store: Arc<dyn Store>,
    pub auth: AuthService,
    pub jwt: JwtService,
    pub avatars: Arc<dyn Storage>,
    pub processor: Arc<dyn ImageProcessor>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health_check,
        handlers::auth::registration::register,
        handlers::auth::registration::verify_email,
        handlers::auth::registration::resend_verification,
        handlers::auth::session::login,
        handlers::auth::session::logout,
        handlers::auth::session::current,
        handlers::auth::profile::update_subscription,
        handlers::auth::profile::update_avatar,
        handlers::contacts::list_contacts,
        handlers::contacts::get_contact,
        handlers::contacts::create_contact,
        handlers::contacts::update_contact,
        handlers::contacts::update_favorite,
        handlers::contacts::delete_contact,
    ),
    components(schemas(
        dtos::ErrorResponse,
        dtos::MessageResponse,
        dtos::auth::RegisterRequest,
        dtos::auth::RegisterResponse,
        dtos::auth::LoginRequest,
        dtos::auth::LoginResponse,
        dtos::auth::CurrentUserResponse,
        dtos::auth::ResendVerificationRequest,
        dtos::auth::UpdateSubscriptionRequest,
        dtos::auth::AvatarResponse,
        dtos::contact::CreateContactRequest,
        dtos::contact::UpdateContactRequest,
        dtos::contact::UpdateFavoriteRequest,
        dtos::contact::ContactResponse,
        models::PublicUser,
        models::Subscription,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Account and session management"),
        (name = "contacts", description = "Owner-scoped contact book"),
        (name = "health", description = "Service probes"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

fn cors_layer(config: &ContactsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/users/register", post(handlers::auth::registration::register))
        .route(
            "/api/users/verify/:token",
            get(handlers::auth::registration::verify_email),
        )
        .route(
            "/api/users/verify",
            post(handlers::auth::registration::resend_verification),
        )
        .route("/api/users/login", post(handlers::auth::session::login));

    let protected = Router::new()
        .route("/api/users/logout", post(handlers::auth::session::logout))
        .route("/api/users/current", get(handlers::auth::session::current))
        .route("/api/users", patch(handlers::auth::profile::update_subscription))
        .route("/api/users/avatars", patch(handlers::auth::profile::update_avatar))
        .route(
            "/api/contacts",
            get(handlers::contacts::list_contacts).post(handlers::contacts::create_contact),
        )
        .route(
            "/api/contacts/:id",
            get(handlers::contacts::get_contact)
                .put(handlers::contacts::update_contact)
                .delete(handlers::contacts::delete_contact),
        )
        .route(
            "/api/contacts/:id/favorite",
            patch(handlers::contacts::update_favorite),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let mut router = public.merge(protected);

    // Swagger UI only outside production
    if state.config.environment == Environment::Dev {
        router = router.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    router
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
