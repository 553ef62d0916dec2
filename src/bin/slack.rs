use lambda_runtime::{Error, service_fn};
use tracing::error;
use weatherbot::api::{BotApp, handler};
use weatherbot::core::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Error> {
    weatherbot::setup_logging();

    let config = AppConfig::from_env().map_err(|e| {
        error!("Config error: {}", e);
        Error::from(e)
    })?;

    let app = BotApp::from_config(&config).await.map_err(|e| {
        error!("Failed to initialize backend: {}", e);
        Error::from(e)
    })?;
    let app = &app;

    lambda_runtime::run(service_fn(move |event| async move { handler(app, event).await })).await
}
