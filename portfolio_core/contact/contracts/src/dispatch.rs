use std::future::Future;

use portfolio_email_contracts::{Email, EmailReceipt};
use thiserror::Error;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactDispatchService: Send + Sync + 'static {
    /// Send the email, giving up once the configured timeout has elapsed.
    ///
    /// Makes exactly one attempt. On timeout the pending transport operation
    /// is dropped.
    fn dispatch(
        &self,
        email: Email,
    ) -> impl Future<Output = Result<EmailReceipt, ContactDispatchError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContactDispatchError {
    #[error("The request timed out while sending the message.")]
    RequestTimeout,
    #[error("The mail server is currently unavailable.")]
    ConnectionRefused,
    #[error("The mail server rejected the configured credentials.")]
    AuthFailure,
    #[error("The connection to the mail server timed out.")]
    TransportTimeout,
    #[error("An unknown error occurred while sending the message.")]
    Unknown,
}

impl ContactDispatchError {
    /// Stable machine readable error code.
    pub fn code(self) -> &'static str {
        match self {
            Self::RequestTimeout => "REQUEST_TIMEOUT",
            Self::ConnectionRefused => "CONNECTION_REFUSED",
            Self::AuthFailure => "AUTH_FAILURE",
            Self::TransportTimeout => "TRANSPORT_TIMEOUT",
            Self::Unknown => "UNKNOWN",
        }
    }
}

#[cfg(feature = "mock")]
impl MockContactDispatchService {
    pub fn with_dispatch(
        mut self,
        email: Email,
        result: Result<EmailReceipt, ContactDispatchError>,
    ) -> Self {
        self.expect_dispatch()
            .once()
            .with(mockall::predicate::eq(email))
            .return_once(|_| Box::pin(std::future::ready(result)));
        self
    }
}
