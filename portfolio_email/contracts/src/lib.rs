use std::{collections::BTreeMap, future::Future};

use portfolio_models::email_address::EmailAddressWithName;
use thiserror::Error;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait EmailService: Send + Sync + 'static {
    /// Hand the email over to the smtp server. Makes exactly one attempt.
    fn send(&self, email: Email) -> impl Future<Output = Result<EmailReceipt, EmailSendError>> + Send;

    /// Verify the connection to the smtp server.
    fn ping(&self) -> impl Future<Output = anyhow::Result<()>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub recipient: EmailAddressWithName,
    pub subject: String,
    pub body: EmailBody,
    /// Additional raw headers. Names must be valid ascii header names.
    pub headers: BTreeMap<String, String>,
    pub reply_to: Option<EmailAddressWithName>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailBody {
    Text(String),
    /// A `multipart/alternative` body with a plain text and an html part.
    Alternative { text: String, html: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailReceipt {
    /// The `Message-ID` header of the sent email.
    pub message_id: String,
}

#[derive(Debug, Error)]
pub enum EmailSendError {
    #[error("The smtp server refused the connection.")]
    ConnectionRefused(#[source] anyhow::Error),
    #[error("Failed to authenticate with the smtp server.")]
    AuthFailure(#[source] anyhow::Error),
    #[error("The connection to the smtp server timed out.")]
    Timeout(#[source] anyhow::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(feature = "mock")]
impl MockEmailService {
    pub fn with_send(mut self, email: Email, result: Result<EmailReceipt, EmailSendError>) -> Self {
        self.expect_send()
            .once()
            .with(mockall::predicate::eq(email))
            .return_once(move |_| Box::pin(std::future::ready(result)));
        self
    }

    /// Expects a single send that never completes.
    pub fn with_send_pending(mut self, email: Email) -> Self {
        self.expect_send()
            .once()
            .with(mockall::predicate::eq(email))
            .return_once(|_| {
                Box::pin(std::future::pending::<Result<EmailReceipt, EmailSendError>>())
            });
        self
    }

    pub fn with_ping(mut self, ok: bool) -> Self {
        self.expect_ping().once().return_once(move || {
            Box::pin(std::future::ready(if ok {
                Ok(())
            } else {
                Err(anyhow::anyhow!("Failed to ping smtp server"))
            }))
        });
        self
    }
}
