mod telemetry;

use activity_roster_backend::error::AppError;
use activity_roster_backend::run_server;
use activity_roster_config::get_config;
use telemetry::setup_telemetry;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    setup_telemetry();

    let config = get_config()?;
    let (address, server) = run_server(config).await?;
    info!("listening on http://{address}");
    server.await
}
