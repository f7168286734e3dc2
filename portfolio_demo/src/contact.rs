use std::sync::LazyLock;

use portfolio_models::contact::{
    ContactSubmission, ContactSubmissionInput, ContactSubmissionMetadata,
};

use crate::NOW;

pub struct DemoSubmission {
    pub input: ContactSubmissionInput,
    pub submission: ContactSubmission,
    pub metadata: ContactSubmissionMetadata,
}

pub static ANN: LazyLock<DemoSubmission> = LazyLock::new(|| {
    let input = ContactSubmissionInput {
        name: "Ann Lee".into(),
        email: "ann@example.com".into(),
        message: "Hello, this is a test message.".into(),
    };
    DemoSubmission {
        submission: ContactSubmission::validate(input.clone()).unwrap(),
        input,
        metadata: ContactSubmissionMetadata {
            origin: Some("https://portfolio.example.com".into()),
            received_at: *NOW,
        },
    }
});

/// A submission with markup in every free text field.
pub static MALLORY: LazyLock<DemoSubmission> = LazyLock::new(|| {
    let input = ContactSubmissionInput {
        name: "Mal O'Ry".into(),
        email: "mallory@example.org".into(),
        message: "<script>alert(\"hi\")</script>\nSecond line & more".into(),
    };
    DemoSubmission {
        submission: ContactSubmission::validate(input.clone()).unwrap(),
        input,
        metadata: ContactSubmissionMetadata {
            origin: None,
            received_at: *NOW,
        },
    }
});
