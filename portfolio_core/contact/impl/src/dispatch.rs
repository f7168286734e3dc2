use std::time::Duration;

use portfolio_core_contact_contracts::dispatch::{ContactDispatchError, ContactDispatchService};
use portfolio_di::Build;
use portfolio_email_contracts::{Email, EmailReceipt, EmailSendError, EmailService};
use portfolio_utils::trace_instrument;
use tracing::error;

#[derive(Debug, Clone, Build)]
pub struct ContactDispatchServiceImpl<Email> {
    pub(crate) email: Email,
    pub(crate) config: ContactDispatchConfig,
}

#[derive(Debug, Clone)]
pub struct ContactDispatchConfig {
    pub timeout: Duration,
}

impl<EmailS> ContactDispatchService for ContactDispatchServiceImpl<EmailS>
where
    EmailS: EmailService,
{
    #[trace_instrument(skip(self, email), fields(recipient = %email.recipient))]
    async fn dispatch(&self, email: Email) -> Result<EmailReceipt, ContactDispatchError> {
        let result = tokio::time::timeout(self.config.timeout, self.email.send(email))
            .await
            .map_err(|_| {
                error!(timeout = ?self.config.timeout, "Timed out while sending contact email");
                ContactDispatchError::RequestTimeout
            })?;

        result.map_err(|err| {
            let mapped = match &err {
                EmailSendError::ConnectionRefused(_) => ContactDispatchError::ConnectionRefused,
                EmailSendError::AuthFailure(_) => ContactDispatchError::AuthFailure,
                EmailSendError::Timeout(_) => ContactDispatchError::TransportTimeout,
                EmailSendError::Other(_) => ContactDispatchError::Unknown,
            };
            error!(
                code = mapped.code(),
                "Failed to send contact email: {:#}",
                anyhow::Error::from(err)
            );
            mapped
        })
    }
}

#[cfg(test)]
mod tests {
    use portfolio_demo::MESSAGE_ID;
    use portfolio_email_contracts::{EmailBody, MockEmailService};

    use super::*;

    fn email() -> Email {
        Email {
            recipient: "owner@example.com".parse().unwrap(),
            subject: "New Contact Form Submission from Ann Lee".into(),
            body: EmailBody::Text("Hello, this is a test message.".into()),
            headers: Default::default(),
            reply_to: None,
        }
    }

    fn sut(email: MockEmailService) -> ContactDispatchServiceImpl<MockEmailService> {
        ContactDispatchServiceImpl {
            email,
            config: ContactDispatchConfig {
                timeout: Duration::from_secs(30),
            },
        }
    }

    #[tokio::test]
    async fn ok() {
        // Arrange
        let receipt = EmailReceipt {
            message_id: MESSAGE_ID.into(),
        };
        let sut = sut(MockEmailService::new().with_send(email(), Ok(receipt.clone())));

        // Act
        let result = sut.dispatch(email()).await;

        // Assert
        assert_eq!(result.unwrap(), receipt);
    }

    #[tokio::test(start_paused = true)]
    async fn request_timeout() {
        // Arrange
        let sut = sut(MockEmailService::new().with_send_pending(email()));
        let start = tokio::time::Instant::now();

        // Act
        let result = sut.dispatch(email()).await;

        // Assert
        assert_eq!(result, Err(ContactDispatchError::RequestTimeout));
        assert!(start.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test]
    async fn transport_errors() {
        let cases = [
            (
                EmailSendError::ConnectionRefused(anyhow::anyhow!("connection refused")),
                ContactDispatchError::ConnectionRefused,
            ),
            (
                EmailSendError::AuthFailure(anyhow::anyhow!("535 authentication failed")),
                ContactDispatchError::AuthFailure,
            ),
            (
                EmailSendError::Timeout(anyhow::anyhow!("timed out")),
                ContactDispatchError::TransportTimeout,
            ),
            (
                EmailSendError::Other(anyhow::anyhow!("something else")),
                ContactDispatchError::Unknown,
            ),
        ];

        for (err, expected) in cases {
            // Arrange
            let sut = sut(MockEmailService::new().with_send(email(), Err(err)));

            // Act
            let result = sut.dispatch(email()).await;

            // Assert
            assert_eq!(result, Err(expected));
        }
    }
}
