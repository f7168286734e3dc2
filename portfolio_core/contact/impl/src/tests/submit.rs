use std::{collections::BTreeMap, sync::Arc, time::Duration};

use portfolio_core_contact_contracts::{
    compose::MockContactComposeService,
    dispatch::{ContactDispatchError, MockContactDispatchService},
    rate_limit::MockContactRateLimitService,
    ContactFeatureService, ContactReceipt, ContactSubmitError,
};
use portfolio_demo::{contact::ANN, CLIENT_IP, CONTACT_RECIPIENT, MESSAGE_ID, NOW};
use portfolio_email_contracts::{Email, EmailBody, EmailReceipt, MockEmailService};
use portfolio_models::contact::{
    ContactField, ContactFieldInput, ContactSubmissionInput, ContactValidationError,
    ContactValidationReason,
};
use portfolio_shared_contracts::time::MockTimeService;
use portfolio_templates_contracts::{ContactNotificationTemplate, MockTemplateService};
use portfolio_utils::assert_matches;
use pretty_assertions::assert_eq;

use crate::{
    compose::{ContactComposeConfig, ContactComposeServiceImpl},
    dispatch::{ContactDispatchConfig, ContactDispatchServiceImpl},
    tests::{admitted, rejected, Sut},
    ContactFeatureServiceImpl,
};

fn email() -> Email {
    Email {
        recipient: CONTACT_RECIPIENT.clone(),
        subject: "New Contact Form Submission from Ann Lee".into(),
        body: EmailBody::Text("Hello, this is a test message.".into()),
        headers: Default::default(),
        reply_to: None,
    }
}

#[tokio::test]
async fn ok() {
    // Arrange
    let time = MockTimeService::new().with_now(*NOW);

    let rate_limit = MockContactRateLimitService::new().with_admit(CLIENT_IP, admitted());

    let compose = MockContactComposeService::new().with_compose(
        ANN.submission.clone(),
        ANN.metadata.clone(),
        email(),
    );

    let dispatch = MockContactDispatchService::new().with_dispatch(
        email(),
        Ok(EmailReceipt {
            message_id: MESSAGE_ID.into(),
        }),
    );

    let sut = ContactFeatureServiceImpl {
        time,
        rate_limit,
        compose,
        dispatch,
    };

    // Act
    let result = sut
        .submit(CLIENT_IP, ANN.input.clone(), ANN.metadata.origin.clone())
        .await;

    // Assert
    assert_eq!(
        result.unwrap(),
        ContactReceipt {
            message_id: MESSAGE_ID.into(),
            timestamp: *NOW,
            rate_limit: admitted(),
        }
    );
}

#[tokio::test]
async fn rate_limited() {
    // Arrange
    let rate_limit = MockContactRateLimitService::new().with_admit(CLIENT_IP, rejected());

    let sut = ContactFeatureServiceImpl {
        rate_limit,
        ..Sut::default()
    };

    // Act
    let result = sut.submit(CLIENT_IP, ANN.input.clone(), None).await;

    // Assert
    assert_matches!(result, Err(ContactSubmitError::RateLimited(status)) if *status == rejected());
}

#[tokio::test]
async fn rate_limited_before_validation() {
    // Arrange
    let rate_limit = MockContactRateLimitService::new().with_admit(CLIENT_IP, rejected());

    let sut = ContactFeatureServiceImpl {
        rate_limit,
        ..Sut::default()
    };

    // Act
    let result = sut
        .submit(CLIENT_IP, ContactSubmissionInput::default(), None)
        .await;

    // Assert
    assert_matches!(result, Err(ContactSubmitError::RateLimited(_)));
}

#[tokio::test]
async fn invalid() {
    // Arrange
    let rate_limit = MockContactRateLimitService::new().with_admit(CLIENT_IP, admitted());

    let sut = ContactFeatureServiceImpl {
        rate_limit,
        ..Sut::default()
    };

    let input = ContactSubmissionInput {
        email: ContactFieldInput::from("not-an-email"),
        ..ANN.input.clone()
    };

    // Act
    let result = sut.submit(CLIENT_IP, input, None).await;

    // Assert
    assert_matches!(
        result,
        Err(ContactSubmitError::Validation(ContactValidationError {
            field: ContactField::Email,
            reason: ContactValidationReason::InvalidFormat,
        }))
    );
}

#[tokio::test]
async fn dispatch_error() {
    // Arrange
    let time = MockTimeService::new().with_now(*NOW);

    let rate_limit = MockContactRateLimitService::new().with_admit(CLIENT_IP, admitted());

    let compose = MockContactComposeService::new().with_compose(
        ANN.submission.clone(),
        ANN.metadata.clone(),
        email(),
    );

    let dispatch = MockContactDispatchService::new()
        .with_dispatch(email(), Err(ContactDispatchError::RequestTimeout));

    let sut = ContactFeatureServiceImpl {
        time,
        rate_limit,
        compose,
        dispatch,
    };

    // Act
    let result = sut
        .submit(CLIENT_IP, ANN.input.clone(), ANN.metadata.origin.clone())
        .await;

    // Assert
    assert_matches!(
        result,
        Err(ContactSubmitError::Dispatch {
            error: ContactDispatchError::RequestTimeout,
            timestamp,
        }) if *timestamp == *NOW
    );
}

#[tokio::test(start_paused = true)]
async fn transport_never_responds() {
    // Arrange
    let time = MockTimeService::new().with_now(*NOW);

    let rate_limit = MockContactRateLimitService::new().with_admit(CLIENT_IP, admitted());

    let mut template = MockTemplateService::new();
    template
        .expect_render::<ContactNotificationTemplate>()
        .once()
        .return_once(|_| Ok("<p>rendered</p>".into()));

    let compose = ContactComposeServiceImpl {
        template,
        config: ContactComposeConfig {
            recipient: Arc::new(CONTACT_RECIPIENT.clone()),
        },
    };

    let expected_email = Email {
        recipient: CONTACT_RECIPIENT.clone(),
        subject: "New Contact Form Submission from Ann Lee".into(),
        body: EmailBody::Alternative {
            text: "New contact form submission\n\nName: Ann Lee\nEmail: \
                   ann@example.com\nOrigin: https://portfolio.example.com\nReceived: \
                   2024-05-17T13:37:42Z\n\nMessage:\nHello, this is a test message.\n"
                .into(),
            html: "<p>rendered</p>".into(),
        },
        headers: BTreeMap::from([
            (
                "X-Contact-Origin".into(),
                "https://portfolio.example.com".into(),
            ),
            ("X-Contact-Received-At".into(), "2024-05-17T13:37:42Z".into()),
        ]),
        reply_to: Some("Ann Lee <ann@example.com>".parse().unwrap()),
    };

    let dispatch = ContactDispatchServiceImpl {
        email: MockEmailService::new().with_send_pending(expected_email),
        config: ContactDispatchConfig {
            timeout: Duration::from_secs(30),
        },
    };

    let sut = ContactFeatureServiceImpl {
        time,
        rate_limit,
        compose,
        dispatch,
    };

    let start = tokio::time::Instant::now();

    // Act
    let result = sut
        .submit(CLIENT_IP, ANN.input.clone(), ANN.metadata.origin.clone())
        .await;

    // Assert
    assert_matches!(
        result,
        Err(ContactSubmitError::Dispatch {
            error: ContactDispatchError::RequestTimeout,
            timestamp,
        }) if *timestamp == *NOW
    );
    assert!(start.elapsed() >= Duration::from_secs(30));
}
