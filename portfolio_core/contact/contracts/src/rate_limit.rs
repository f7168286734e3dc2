use std::{future::Future, net::IpAddr, time::Duration};

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactRateLimitService: Send + Sync + 'static {
    /// Count a request of the given client against its current window.
    ///
    /// Rejected requests are not counted.
    fn admit(&self, client_ip: IpAddr) -> impl Future<Output = RateLimitStatus> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub allowed: bool,
    /// Maximum number of requests per window.
    pub limit: u64,
    /// Requests left in the current window.
    pub remaining: u64,
    /// Time until the current window ends.
    pub reset_after: Duration,
}

impl RateLimitStatus {
    /// Whole seconds until the current window ends, rounded up.
    pub fn reset_after_secs(&self) -> u64 {
        self.reset_after.as_secs() + u64::from(self.reset_after.subsec_nanos() > 0)
    }
}

#[cfg(feature = "mock")]
impl MockContactRateLimitService {
    pub fn with_admit(mut self, client_ip: IpAddr, result: RateLimitStatus) -> Self {
        self.expect_admit()
            .once()
            .with(mockall::predicate::eq(client_ip))
            .return_once(move |_| Box::pin(std::future::ready(result)));
        self
    }
}
