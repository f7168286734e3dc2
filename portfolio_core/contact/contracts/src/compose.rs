use portfolio_email_contracts::Email;
use portfolio_models::contact::{ContactSubmission, ContactSubmissionMetadata};

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactComposeService: Send + Sync + 'static {
    /// Build the notification email for a validated submission.
    fn compose(
        &self,
        submission: &ContactSubmission,
        metadata: &ContactSubmissionMetadata,
    ) -> anyhow::Result<Email>;
}

#[cfg(feature = "mock")]
impl MockContactComposeService {
    pub fn with_compose(
        mut self,
        submission: ContactSubmission,
        metadata: ContactSubmissionMetadata,
        result: Email,
    ) -> Self {
        self.expect_compose()
            .once()
            .with(
                mockall::predicate::eq(submission),
                mockall::predicate::eq(metadata),
            )
            .return_once(|_, _| Ok(result));
        self
    }
}
