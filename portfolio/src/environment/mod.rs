use std::sync::Arc;

use anyhow::{ensure, Context};
use axum::http::HeaderValue;
use portfolio_api_rest::{RestServerConfig, RestServerRealIpConfig};
use portfolio_config::Config;
use portfolio_core_contact_impl::{
    compose::ContactComposeConfig, dispatch::ContactDispatchConfig,
    rate_limit::ContactRateLimitConfig,
};
use portfolio_core_health_impl::HealthFeatureConfig;
use portfolio_di::provider;
use types::Email;

pub mod types;

provider! {
    /// The default provider, capable of providing all the dependencies
    pub Provider {
        email: Email,
        ..config: ConfigProvider {
            // API
            RestServerConfig,

            // Core
            ContactRateLimitConfig,
            ContactComposeConfig,
            ContactDispatchConfig,
            HealthFeatureConfig,
        }
    }
}

impl Provider {
    pub fn new(config: ConfigProvider, email: Email) -> Self {
        Self {
            _cache: Default::default(),
            email,
            config,
        }
    }
}

provider! {
    /// Reduced provider, capable of providing services that only depend on the configuration
    pub ConfigProvider {
        // API
        rest_server_config: RestServerConfig,

        // Core
        contact_rate_limit_config: ContactRateLimitConfig,
        contact_compose_config: ContactComposeConfig,
        contact_dispatch_config: ContactDispatchConfig,
        health_feature_config: HealthFeatureConfig,
    }
}

impl ConfigProvider {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        // API
        let allowed_origins = config
            .http
            .allowed_origins
            .iter()
            .map(|origin| {
                ensure!(
                    origin != "*",
                    "Leave http.allowed_origins empty to allow any origin"
                );
                HeaderValue::from_str(origin)
                    .with_context(|| format!("Invalid allowed origin: {origin:?}"))
            })
            .collect::<anyhow::Result<Arc<[_]>>>()?;

        let rest_server_config = RestServerConfig {
            addr: config.http.address,
            real_ip_config: config.http.real_ip.as_ref().map(|real_ip_config| {
                Arc::new(RestServerRealIpConfig {
                    header: real_ip_config.header.clone(),
                    set_from: real_ip_config.set_from,
                })
            }),
            allowed_origins,
        };

        // Core
        ensure!(
            !config.rate_limit.window.0.is_zero(),
            "rate_limit.window must not be zero"
        );
        ensure!(
            config.rate_limit.max_requests > 0,
            "rate_limit.max_requests must not be zero"
        );
        ensure!(
            !config.contact.dispatch_timeout.0.is_zero(),
            "contact.dispatch_timeout must not be zero"
        );
        ensure!(
            !config.email.timeout.is_some_and(|timeout| timeout.0.is_zero()),
            "email.timeout must not be zero"
        );

        let contact_rate_limit_config = ContactRateLimitConfig {
            window: config.rate_limit.window.into(),
            max_requests: config.rate_limit.max_requests,
        };

        let contact_compose_config = ContactComposeConfig {
            recipient: config.contact.email.clone().into(),
        };

        let contact_dispatch_config = ContactDispatchConfig {
            timeout: config.contact.dispatch_timeout.into(),
        };

        let health_feature_config = HealthFeatureConfig {
            cache_ttl: config.health.cache_ttl.into(),
        };

        Ok(Self {
            _cache: Default::default(),

            // API
            rest_server_config,

            // Core
            contact_rate_limit_config,
            contact_compose_config,
            contact_dispatch_config,
            health_feature_config,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use portfolio_config::DEFAULT_CONFIG_PATH;
    use portfolio_core_contact_contracts::rate_limit::ContactRateLimitService;
    use portfolio_demo::CLIENT_IP;
    use portfolio_di::Provide;
    use portfolio_email_impl::EmailServiceImpl;
    use types::{ContactRateLimit, RestServer};

    use super::*;

    fn default_config() -> Config {
        portfolio_config::load_paths(&[Path::new(DEFAULT_CONFIG_PATH)]).unwrap()
    }

    #[tokio::test]
    async fn provide_rest_server() {
        let config_provider = ConfigProvider::new(&default_config()).unwrap();
        let email = EmailServiceImpl::dummy().await;

        let mut provider = Provider::new(config_provider, email);
        let _: RestServer = provider.provide();
    }

    #[tokio::test]
    async fn rate_limit_state_is_shared() {
        // Arrange
        let config_provider = ConfigProvider::new(&default_config()).unwrap();
        let email = EmailServiceImpl::dummy().await;
        let mut provider = Provider::new(config_provider, email);

        let first: ContactRateLimit = provider.provide();
        let second: ContactRateLimit = provider.provide();

        // Act
        for _ in 0..5 {
            assert!(first.admit(CLIENT_IP).await.allowed);
        }
        let result = second.admit(CLIENT_IP).await;

        // Assert
        assert!(!result.allowed);
    }

    #[test]
    fn zero_limits_rejected() {
        let zero = portfolio_config::Duration(std::time::Duration::ZERO);
        let cases: [fn(&mut Config, portfolio_config::Duration); 4] = [
            |config, zero| config.rate_limit.window = zero,
            |config, _| config.rate_limit.max_requests = 0,
            |config, zero| config.contact.dispatch_timeout = zero,
            |config, zero| config.email.timeout = Some(zero),
        ];

        for modify in cases {
            // Arrange
            let mut config = default_config();
            modify(&mut config, zero);

            // Act
            let result = ConfigProvider::new(&config);

            // Assert
            assert!(result.is_err());
        }
    }

    #[test]
    fn wildcard_origin_rejected() {
        // Arrange
        let mut config = default_config();
        config.http.allowed_origins = vec!["*".into()];

        // Act
        let result = ConfigProvider::new(&config);

        // Assert
        assert!(result.is_err());
    }
}
