use std::net::IpAddr;

use anyhow::Context;
use portfolio_core_contact_contracts::{
    compose::ContactComposeService, dispatch::ContactDispatchService,
    rate_limit::ContactRateLimitService, ContactFeatureService, ContactReceipt, ContactSubmitError,
};
use portfolio_di::Build;
use portfolio_models::contact::{
    ContactSubmission, ContactSubmissionInput, ContactSubmissionMetadata,
};
use portfolio_shared_contracts::time::TimeService;
use portfolio_utils::trace_instrument;
use tracing::{debug, info};

pub mod compose;
pub mod dispatch;
pub mod rate_limit;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Build)]
#[cfg_attr(test, derive(Default))]
pub struct ContactFeatureServiceImpl<Time, RateLimit, Compose, Dispatch> {
    time: Time,
    rate_limit: RateLimit,
    compose: Compose,
    dispatch: Dispatch,
}

impl<Time, RateLimit, Compose, Dispatch> ContactFeatureService
    for ContactFeatureServiceImpl<Time, RateLimit, Compose, Dispatch>
where
    Time: TimeService,
    RateLimit: ContactRateLimitService,
    Compose: ContactComposeService,
    Dispatch: ContactDispatchService,
{
    #[trace_instrument(skip(self, input))]
    async fn submit(
        &self,
        client_ip: IpAddr,
        input: ContactSubmissionInput,
        origin: Option<String>,
    ) -> Result<ContactReceipt, ContactSubmitError> {
        let rate_limit = self.rate_limit.admit(client_ip).await;
        if !rate_limit.allowed {
            info!(%client_ip, "Contact submission rejected by rate limit");
            return Err(ContactSubmitError::RateLimited(rate_limit));
        }

        let submission = ContactSubmission::validate(input)
            .inspect_err(|err| debug!(field = %err.field, "Invalid contact submission: {err}"))?;

        let metadata = ContactSubmissionMetadata {
            origin,
            received_at: self.time.now(),
        };

        let email = self
            .compose
            .compose(&submission, &metadata)
            .context("Failed to compose contact email")?;

        let receipt = self
            .dispatch
            .dispatch(email)
            .await
            .map_err(|error| ContactSubmitError::Dispatch {
                error,
                timestamp: metadata.received_at,
            })?;

        info!(message_id = %receipt.message_id, "Contact submission forwarded");

        Ok(ContactReceipt {
            message_id: receipt.message_id,
            timestamp: metadata.received_at,
            rate_limit,
        })
    }
}
