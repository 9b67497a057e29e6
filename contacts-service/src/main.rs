use contacts_service::config::ContactsConfig;
use contacts_service::startup::Application;
use service_core::error::AppError;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    let config = ContactsConfig::from_env()?;
    let otlp_endpoint = std::env::var("OTLP_ENDPOINT").ok();
    init_tracing(
        &config.service_name,
        &config.common.log_level,
        otlp_endpoint.as_deref(),
    );

    let app = Application::build(config).await?;
    app.run_until_stopped().await
}
