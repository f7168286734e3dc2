use std::{collections::BTreeMap, sync::Arc};

use chrono::SecondsFormat;
use portfolio_core_contact_contracts::compose::ContactComposeService;
use portfolio_di::Build;
use portfolio_email_contracts::{Email, EmailBody};
use portfolio_models::{
    contact::{ContactSubmission, ContactSubmissionMetadata},
    email_address::EmailAddressWithName,
};
use portfolio_templates_contracts::{ContactNotificationTemplate, TemplateService};
use portfolio_utils::{
    html::{escape_html, nl2br},
    trace_instrument,
};

pub const ORIGIN_HEADER: &str = "X-Contact-Origin";
pub const RECEIVED_AT_HEADER: &str = "X-Contact-Received-At";

#[derive(Debug, Clone, Build)]
pub struct ContactComposeServiceImpl<Template> {
    pub(crate) template: Template,
    pub(crate) config: ContactComposeConfig,
}

#[derive(Debug, Clone)]
pub struct ContactComposeConfig {
    /// Address that receives the notifications.
    pub recipient: Arc<EmailAddressWithName>,
}

impl<TemplateS> ContactComposeService for ContactComposeServiceImpl<TemplateS>
where
    TemplateS: TemplateService,
{
    #[trace_instrument(skip(self, submission, metadata))]
    fn compose(
        &self,
        submission: &ContactSubmission,
        metadata: &ContactSubmissionMetadata,
    ) -> anyhow::Result<Email> {
        let received_at = metadata
            .received_at
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        let name = escape_html(&submission.name);

        let html = self.template.render(&ContactNotificationTemplate {
            name: name.clone(),
            email: escape_html(submission.email.as_str()),
            message: nl2br(&escape_html(&submission.message)),
            origin: metadata.origin.as_deref().map(escape_html),
            received_at: received_at.clone(),
        })?;

        let text = format!(
            "New contact form submission\n\nName: {}\nEmail: {}\nOrigin: {}\nReceived: {}\n\nMessage:\n{}\n",
            *submission.name,
            submission.email,
            metadata.origin.as_deref().unwrap_or("unknown"),
            received_at,
            *submission.message,
        );

        let mut headers = BTreeMap::from([(RECEIVED_AT_HEADER.into(), received_at)]);
        if let Some(origin) = &metadata.origin {
            headers.insert(ORIGIN_HEADER.into(), origin.clone());
        }

        Ok(Email {
            recipient: (*self.config.recipient).clone(),
            subject: format!("New Contact Form Submission from {name}"),
            body: EmailBody::Alternative { text, html },
            headers,
            reply_to: Some(
                submission
                    .email
                    .clone()
                    .with_name(submission.name.clone().into_inner()),
            ),
        })
    }
}
