use std::{future::Future, time::Duration};

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait HealthFeatureService: Send + Sync + 'static {
    /// Return the current health status of the service.
    fn get_status(&self) -> impl Future<Output = HealthStatus> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthStatus {
    /// Whether the smtp server is reachable.
    pub email: bool,
    /// Time since the service has been started.
    pub uptime: Duration,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.email
    }
}

#[cfg(feature = "mock")]
impl MockHealthFeatureService {
    pub fn with_get_status(mut self, result: HealthStatus) -> Self {
        self.expect_get_status()
            .once()
            .return_once(move || Box::pin(std::future::ready(result)));
        self
    }
}
