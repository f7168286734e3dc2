use anyhow::Context;
use portfolio_config::EmailConfig;
use portfolio_email_impl::EmailServiceImpl;

/// Connect to the SMTP server
pub async fn connect(config: &EmailConfig) -> anyhow::Result<EmailServiceImpl> {
    EmailServiceImpl::new(
        &config.smtp_url,
        config.from.clone(),
        config.timeout.map(Into::into),
    )
    .await
    .context("Failed to connect to SMTP server")
}
