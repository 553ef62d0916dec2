use lambda_runtime::{Error, service_fn};
use tracing::error;
use weatherbot::action::function_handler;
use weatherbot::core::config::WeatherConfig;
use weatherbot::weather::WeatherClient;

#[tokio::main]
async fn main() -> Result<(), Error> {
    weatherbot::setup_logging();

    let weather = WeatherClient::new(&WeatherConfig::from_env()).map_err(|e| {
        error!("Failed to build weather client: {}", e);
        Error::from(e)
    })?;
    let weather = &weather;

    lambda_runtime::run(service_fn(move |event| async move {
        function_handler(weather, event).await
    }))
    .await
}
