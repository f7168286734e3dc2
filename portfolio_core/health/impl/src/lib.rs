use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use portfolio_core_health_contracts::{HealthFeatureService, HealthStatus};
use portfolio_di::Build;
use portfolio_email_contracts::EmailService;
use portfolio_shared_contracts::time::TimeService;
use portfolio_utils::trace_instrument;
use tokio::sync::RwLock;
use tracing::error;

#[derive(Debug, Clone, Build)]
pub struct HealthFeatureServiceImpl<Time, Email> {
    time: Time,
    email: Email,
    config: HealthFeatureConfig,
    #[state]
    state: Arc<State>,
}

#[derive(Debug, Clone)]
pub struct HealthFeatureConfig {
    pub cache_ttl: Duration,
}

#[derive(Debug)]
struct State {
    started: Instant,
    cache: RwLock<Option<CachedStatus>>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            started: Instant::now(),
            cache: Default::default(),
        }
    }
}

#[derive(Debug)]
struct CachedStatus {
    email: bool,
    timestamp: DateTime<Utc>,
}

impl<Time, Email> HealthFeatureService for HealthFeatureServiceImpl<Time, Email>
where
    Time: TimeService,
    Email: EmailService,
{
    #[trace_instrument(skip(self))]
    async fn get_status(&self) -> HealthStatus {
        let uptime = self.state.started.elapsed();
        let status = |email| HealthStatus { email, uptime };

        let now = self.time.now();
        let cache_guard = self.state.cache.read().await;
        if let Some(cached) = cache_guard
            .as_ref()
            .filter(|c| now < c.timestamp + self.config.cache_ttl)
        {
            return status(cached.email);
        }
        drop(cache_guard);

        let mut cache_guard = self.state.cache.write().await;
        if let Some(cached) = cache_guard
            .as_ref()
            .filter(|c| now < c.timestamp + self.config.cache_ttl)
        {
            return status(cached.email);
        }

        let email = self
            .email
            .ping()
            .await
            .inspect_err(|err| error!("Failed to ping smtp server: {err}"))
            .is_ok();

        status(
            cache_guard
                .insert(CachedStatus {
                    email,
                    timestamp: now,
                })
                .email,
        )
    }
}

#[cfg(test)]
mod tests {
    use portfolio_demo::NOW;
    use portfolio_email_contracts::MockEmailService;
    use portfolio_shared_contracts::time::MockTimeService;

    use super::*;

    fn sut(
        time: MockTimeService,
        email: MockEmailService,
    ) -> HealthFeatureServiceImpl<MockTimeService, MockEmailService> {
        HealthFeatureServiceImpl {
            time,
            email,
            config: HealthFeatureConfig {
                cache_ttl: Duration::from_secs(2),
            },
            state: Default::default(),
        }
    }

    #[tokio::test]
    async fn healthy() {
        // Arrange
        let sut = sut(
            MockTimeService::new().with_now(*NOW),
            MockEmailService::new().with_ping(true),
        );

        // Act
        let result = sut.get_status().await;

        // Assert
        assert!(result.email);
        assert!(result.is_healthy());
    }

    #[tokio::test]
    async fn smtp_unreachable() {
        // Arrange
        let sut = sut(
            MockTimeService::new().with_now(*NOW),
            MockEmailService::new().with_ping(false),
        );

        // Act
        let result = sut.get_status().await;

        // Assert
        assert!(!result.email);
        assert!(!result.is_healthy());
    }

    #[tokio::test]
    async fn cached() {
        // Arrange
        let times = [*NOW, *NOW + Duration::from_secs(1)];
        let sut = sut(
            MockTimeService::new().with_sequence(times),
            MockEmailService::new().with_ping(true),
        );

        // Act
        let first = sut.get_status().await;
        let second = sut.get_status().await;

        // Assert
        assert!(first.email);
        assert!(second.email);
        assert!(second.uptime >= first.uptime);
    }

    #[tokio::test]
    async fn cache_expired() {
        // Arrange
        let times = [*NOW, *NOW + Duration::from_secs(2)];
        let mut email = MockEmailService::new();
        let mut seq = mockall::Sequence::new();
        email
            .expect_ping()
            .once()
            .in_sequence(&mut seq)
            .return_once(|| Box::pin(std::future::ready(Ok(()))));
        email
            .expect_ping()
            .once()
            .in_sequence(&mut seq)
            .return_once(|| Box::pin(std::future::ready(Err(anyhow::anyhow!("down")))));
        let sut = sut(MockTimeService::new().with_sequence(times), email);

        // Act
        let first = sut.get_status().await;
        let second = sut.get_status().await;

        // Assert
        assert!(first.email);
        assert!(!second.email);
    }
}
