use portfolio_config::Config;
use portfolio_di::Provide;
use portfolio_email_contracts::EmailService;
use tracing::{info, warn};

use crate::{
    email,
    environment::{types::RestServer, ConfigProvider, Provider},
};

pub async fn serve(config: Config) -> anyhow::Result<()> {
    info!("Connecting to smtp server");
    let email = email::connect(&config.email).await?;
    if let Err(err) = email.ping().await {
        warn!("Failed to ping smtp server: {err:#}");
    }

    let config_provider = ConfigProvider::new(&config)?;
    let mut provider = Provider::new(config_provider, email);
    let server: RestServer = provider.provide();
    info!("Starting http server on {}", config.http.address);
    server.serve().await
}
