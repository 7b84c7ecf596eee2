mod api_doc;
mod audit;
mod auth;
mod constants;
mod error;
mod handlers;
mod middleware;
mod setup;
mod state;
mod telemetry;

use toolgate_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (database, services, routes)
    let (_state, router) = crate::setup::initialize_app(config.clone()).await?;

    // Start the server
    crate::setup::server::start_server(&config, router).await?;

    Ok(())
}
