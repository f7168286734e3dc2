use std::time::Duration;

use portfolio_core_contact_contracts::{
    compose::MockContactComposeService, dispatch::MockContactDispatchService,
    rate_limit::{MockContactRateLimitService, RateLimitStatus},
};
use portfolio_shared_contracts::time::MockTimeService;

use crate::ContactFeatureServiceImpl;

mod submit;

type Sut = ContactFeatureServiceImpl<
    MockTimeService,
    MockContactRateLimitService,
    MockContactComposeService,
    MockContactDispatchService,
>;

fn admitted() -> RateLimitStatus {
    RateLimitStatus {
        allowed: true,
        limit: 5,
        remaining: 4,
        reset_after: Duration::from_secs(60 * 60),
    }
}

fn rejected() -> RateLimitStatus {
    RateLimitStatus {
        allowed: false,
        limit: 5,
        remaining: 0,
        reset_after: Duration::from_secs(42 * 60),
    }
}
