use std::{future::Future, net::IpAddr};

use chrono::{DateTime, Utc};
use dispatch::ContactDispatchError;
use portfolio_models::contact::{ContactSubmissionInput, ContactValidationError};
use rate_limit::RateLimitStatus;
use thiserror::Error;

pub mod compose;
pub mod dispatch;
pub mod rate_limit;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactFeatureService: Send + Sync + 'static {
    /// Process a contact form submission and forward it to the site owner.
    ///
    /// The rate limit of `client_ip` is checked before the input is
    /// validated, so rejected requests never reach the mail server.
    fn submit(
        &self,
        client_ip: IpAddr,
        input: ContactSubmissionInput,
        origin: Option<String>,
    ) -> impl Future<Output = Result<ContactReceipt, ContactSubmitError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactReceipt {
    /// The `Message-ID` of the notification email.
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
    pub rate_limit: RateLimitStatus,
}

#[derive(Debug, Error)]
pub enum ContactSubmitError {
    #[error("Too many contact requests.")]
    RateLimited(RateLimitStatus),
    #[error(transparent)]
    Validation(#[from] ContactValidationError),
    #[error("Failed to deliver the contact message.")]
    Dispatch {
        #[source]
        error: ContactDispatchError,
        timestamp: DateTime<Utc>,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(feature = "mock")]
impl MockContactFeatureService {
    pub fn with_submit(
        mut self,
        client_ip: IpAddr,
        input: ContactSubmissionInput,
        origin: Option<String>,
        result: Result<ContactReceipt, ContactSubmitError>,
    ) -> Self {
        self.expect_submit()
            .once()
            .with(
                mockall::predicate::eq(client_ip),
                mockall::predicate::eq(input),
                mockall::predicate::eq(origin),
            )
            .return_once(|_, _, _| Box::pin(std::future::ready(result)));
        self
    }
}
