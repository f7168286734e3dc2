use clap::Subcommand;
use portfolio_config::Config;
use portfolio_email_contracts::{Email, EmailBody, EmailService};
use portfolio_models::email_address::EmailAddressWithName;
use tracing::info;

use crate::email;

#[derive(Debug, Subcommand)]
pub enum EmailCommand {
    /// Test email deliverability
    Test { recipient: EmailAddressWithName },
}

impl EmailCommand {
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        match self {
            EmailCommand::Test { recipient } => test(config, recipient).await,
        }
    }
}

async fn test(config: Config, recipient: EmailAddressWithName) -> anyhow::Result<()> {
    let email_service = email::connect(&config.email).await?;

    let receipt = email_service
        .send(Email {
            recipient,
            subject: "Email Deliverability Test".into(),
            body: EmailBody::Text("Email deliverability seems to be working!".into()),
            headers: Default::default(),
            reply_to: None,
        })
        .await?;

    info!(message_id = %receipt.message_id, "Test email sent");

    Ok(())
}
