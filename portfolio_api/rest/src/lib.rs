use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use axum::{http::HeaderValue, Router};
use portfolio_core_contact_contracts::ContactFeatureService;
use portfolio_core_health_contracts::HealthFeatureService;
use portfolio_di::Build;
use tokio::net::TcpListener;
use tracing::info;

mod middlewares;
mod models;
mod routes;

#[derive(Debug, Clone, Build)]
pub struct RestServer<Health, Contact> {
    health: Health,
    contact: Contact,
    config: RestServerConfig,
}

#[derive(Debug, Clone)]
pub struct RestServerConfig {
    pub addr: SocketAddr,
    pub real_ip_config: Option<Arc<RestServerRealIpConfig>>,
    /// Origins allowed to make cross origin requests. Any origin is allowed
    /// if empty.
    pub allowed_origins: Arc<[HeaderValue]>,
}

/// Trust the client ip in `header` if the request comes from `set_from`.
#[derive(Debug, Clone)]
pub struct RestServerRealIpConfig {
    pub header: String,
    pub set_from: IpAddr,
}

impl<Health, Contact> RestServer<Health, Contact>
where
    Health: HealthFeatureService,
    Contact: ContactFeatureService,
{
    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = self.config.addr;
        let router = self.router();

        let listener = TcpListener::bind(addr).await?;
        info!("Listening on {}", listener.local_addr()?);

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(Into::into)
    }

    fn router(self) -> Router<()> {
        let router = Router::new()
            .merge(routes::index::router())
            .merge(routes::health::router(Arc::new(self.health)))
            .merge(routes::contact::router(Arc::new(self.contact)));

        // Layers added last run first.
        let router = middlewares::panic_handler::add(router);
        let router = middlewares::trace::add(router);
        let router = middlewares::request_id::add(router);
        let router = middlewares::client_ip::add(self.config.real_ip_config)(router);
        middlewares::cors::add(&self.config.allowed_origins)(router)
    }
}
