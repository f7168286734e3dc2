use std::{collections::HashMap, net::IpAddr, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use portfolio_core_contact_contracts::rate_limit::{ContactRateLimitService, RateLimitStatus};
use portfolio_di::Build;
use portfolio_shared_contracts::time::TimeService;
use portfolio_utils::trace_instrument;
use tokio::sync::Mutex;

/// Fixed window rate limiter keyed by client ip.
///
/// All windows live in memory and are lost on restart.
#[derive(Debug, Clone, Build)]
pub struct ContactRateLimitServiceImpl<Time> {
    time: Time,
    config: ContactRateLimitConfig,
    #[state]
    state: Arc<State>,
}

#[derive(Debug, Clone)]
pub struct ContactRateLimitConfig {
    pub window: Duration,
    pub max_requests: u64,
}

impl Default for ContactRateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(60 * 60),
            max_requests: 5,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    windows: Mutex<HashMap<IpAddr, Window>>,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    start: DateTime<Utc>,
    count: u64,
}

impl<Time> ContactRateLimitService for ContactRateLimitServiceImpl<Time>
where
    Time: TimeService,
{
    #[trace_instrument(skip(self))]
    async fn admit(&self, client_ip: IpAddr) -> RateLimitStatus {
        let mut windows = self.state.windows.lock().await;
        let now = self.time.now();
        let period = self.config.window;
        windows.retain(|_, window| now < window.start + period);

        let window = windows.entry(client_ip).or_insert(Window {
            start: now,
            count: 0,
        });

        let allowed = window.count < self.config.max_requests;
        if allowed {
            window.count += 1;
        }

        RateLimitStatus {
            allowed,
            limit: self.config.max_requests,
            remaining: self.config.max_requests.saturating_sub(window.count),
            reset_after: (window.start + period - now).to_std().unwrap_or_default(),
        }
    }
}
