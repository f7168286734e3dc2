use std::{io, time::Duration};

use anyhow::{anyhow, Context};
use lettre::{
    message::{
        header::{ContentType, HeaderName, HeaderValue},
        MessageBuilder, MultiPart,
    },
    transport::smtp,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use portfolio_email_contracts::{Email, EmailBody, EmailReceipt, EmailSendError, EmailService};
use portfolio_models::email_address::EmailAddressWithName;
use portfolio_utils::{trace_instrument, Apply};
use uuid::Uuid;

/// Reply codes the smtp server uses to reject the credentials.
const AUTH_FAILURE_CODES: &[&str] = &["454", "530", "534", "535"];

#[derive(Debug, Clone)]
pub struct EmailServiceImpl {
    from: EmailAddressWithName,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailServiceImpl {
    /// Create a new email service for the smtp server at `url`.
    ///
    /// `timeout` bounds every individual network operation of the transport.
    /// The connection is established lazily.
    pub async fn new(
        url: &str,
        from: EmailAddressWithName,
        timeout: Option<Duration>,
    ) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::from_url(url)?
            .timeout(timeout)
            .build();

        Ok(Self { from, transport })
    }

    #[cfg(feature = "dummy")]
    pub async fn dummy() -> Self {
        Self::new("smtp://dummy", "dummy@example.com".parse().unwrap(), None)
            .await
            .unwrap()
    }

    fn build_message(&self, email: Email, message_id: String) -> anyhow::Result<Message> {
        let builder = Message::builder()
            .from(self.from.0.clone())
            .to(email.recipient.0)
            .message_id(Some(message_id))
            .apply_map(email.reply_to, |builder, reply_to| {
                builder.reply_to(reply_to.0)
            })
            .subject(email.subject);

        let builder = email
            .headers
            .into_iter()
            .try_fold(builder, |builder: MessageBuilder, (name, value)| {
                let header_name = HeaderName::new_from_ascii(name.clone())
                    .map_err(|err| anyhow!("Invalid email header name {name:?}: {err}"))?;
                anyhow::Ok(builder.raw_header(HeaderValue::new(header_name, value)))
            })?;

        match email.body {
            EmailBody::Text(text) => builder.header(ContentType::TEXT_PLAIN).body(text),
            EmailBody::Alternative { text, html } => {
                builder.multipart(MultiPart::alternative_plain_html(text, html))
            }
        }
        .context("Failed to build email")
    }

    fn message_id(&self) -> String {
        format!("<{}@{}>", Uuid::new_v4(), self.from.0.email.domain())
    }
}

impl EmailService for EmailServiceImpl {
    #[trace_instrument(skip(self, email), fields(recipient = %email.recipient))]
    async fn send(&self, email: Email) -> Result<EmailReceipt, EmailSendError> {
        let message_id = self.message_id();
        let message = self.build_message(email, message_id.clone())?;

        self.transport
            .send(message)
            .await
            .map(|_| EmailReceipt { message_id })
            .map_err(classify_error)
    }

    #[trace_instrument(skip(self))]
    async fn ping(&self) -> anyhow::Result<()> {
        self.transport
            .test_connection()
            .await?
            .then_some(())
            .ok_or_else(|| anyhow!("Failed to ping smtp server"))
    }
}

fn classify_error(err: smtp::Error) -> EmailSendError {
    let io_kind = io_error_kind(&err);

    if err.is_timeout() || io_kind == Some(io::ErrorKind::TimedOut) {
        EmailSendError::Timeout(err.into())
    } else if io_kind == Some(io::ErrorKind::ConnectionRefused)
        || err.to_string().to_lowercase().contains("connection refused")
    {
        EmailSendError::ConnectionRefused(err.into())
    } else if err
        .status()
        .is_some_and(|code| AUTH_FAILURE_CODES.contains(&code.to_string().as_str()))
    {
        EmailSendError::AuthFailure(err.into())
    } else {
        EmailSendError::Other(err.into())
    }
}

/// Returns the kind of the first [`io::Error`] in the source chain of `err`.
fn io_error_kind(err: &(dyn std::error::Error + 'static)) -> Option<io::ErrorKind> {
    std::iter::successors(Some(err), |err| err.source())
        .find_map(|err| err.downcast_ref::<io::Error>())
        .map(io::Error::kind)
}
