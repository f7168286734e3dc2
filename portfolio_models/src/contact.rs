//! Contact form submissions and their validation.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use nutype::nutype;
use regex::Regex;
use thiserror::Error;

use crate::email_address::EmailAddress;

/// Letters, spaces, hyphens, apostrophes and periods. Other whitespace is
/// collapsed into single spaces before matching.
pub static CONTACT_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L} '.-]+$").unwrap());

/// A practical subset of RFC 5322: a local part, an `@` and at least two
/// dot separated domain labels of at most 63 characters each. Applied after
/// lower-casing.
pub static CONTACT_EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^[a-z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?)+$"#,
    )
    .unwrap()
});

#[nutype(
    sanitize(with = |s: String| s.split_whitespace().collect::<Vec<_>>().join(" ")),
    validate(
        len_char_min = ContactName::MIN_LENGTH,
        len_char_max = ContactName::MAX_LENGTH,
        regex = CONTACT_NAME_REGEX,
    ),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Serialize, Deserialize)
)]
pub struct ContactName(String);

impl ContactName {
    pub const MIN_LENGTH: usize = 2;
    pub const MAX_LENGTH: usize = 100;
}

#[nutype(
    sanitize(trim, lowercase),
    validate(len_char_max = 254, regex = CONTACT_EMAIL_REGEX),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref)
)]
pub struct ContactEmail(String);

#[nutype(
    sanitize(trim),
    validate(
        len_char_min = ContactMessageContent::MIN_LENGTH,
        len_char_max = ContactMessageContent::MAX_LENGTH,
    ),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Serialize, Deserialize)
)]
pub struct ContactMessageContent(String);

impl ContactMessageContent {
    pub const MIN_LENGTH: usize = 10;
    pub const MAX_LENGTH: usize = 2000;
}

/// A validated contact form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: ContactName,
    pub email: EmailAddress,
    pub message: ContactMessageContent,
}

/// Request metadata recorded alongside a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmissionMetadata {
    /// Value of the `Origin` header of the request, if any.
    pub origin: Option<String>,
    pub received_at: DateTime<Utc>,
}

/// An unvalidated contact form submission as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactSubmissionInput {
    pub name: ContactFieldInput,
    pub email: ContactFieldInput,
    pub message: ContactFieldInput,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ContactFieldInput {
    #[default]
    Missing,
    Text(String),
    /// The field is present but does not hold text.
    WrongType,
}

impl From<&str> for ContactFieldInput {
    fn from(value: &str) -> Self {
        Self::Text(value.into())
    }
}

impl From<String> for ContactFieldInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactField {
    Name,
    Email,
    Message,
}

impl ContactField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Message => "message",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Message => "Message",
        }
    }
}

impl std::fmt::Display for ContactField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.as_str().fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactValidationReason {
    Missing,
    WrongType,
    TooShort { min: usize },
    TooLong { max: usize },
    InvalidCharacters,
    InvalidFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub struct ContactValidationError {
    pub field: ContactField,
    pub reason: ContactValidationReason,
}

impl std::fmt::Display for ContactValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = self.field.label();
        match self.reason {
            ContactValidationReason::Missing => write!(f, "{label} is required."),
            ContactValidationReason::WrongType => write!(f, "{label} must be a string."),
            ContactValidationReason::TooShort { min } => {
                write!(f, "{label} must be at least {min} characters long.")
            }
            ContactValidationReason::TooLong { max } => {
                write!(f, "{label} must be at most {max} characters long.")
            }
            ContactValidationReason::InvalidCharacters => write!(
                f,
                "{label} may only contain letters, spaces, hyphens, apostrophes and periods."
            ),
            ContactValidationReason::InvalidFormat => write!(f, "Invalid {} format.", self.field),
        }
    }
}

impl ContactValidationError {
    fn new(field: ContactField, reason: ContactValidationReason) -> Self {
        Self { field, reason }
    }
}

impl ContactSubmission {
    /// Validates and normalizes a submission.
    ///
    /// Fields are checked in the order name, email, message and the first
    /// failure is returned, so the reported error is deterministic.
    pub fn validate(input: ContactSubmissionInput) -> Result<Self, ContactValidationError> {
        use ContactValidationReason::*;

        let name = input.name.into_text(ContactField::Name)?;
        let name = ContactName::try_new(name).map_err(|err| {
            ContactValidationError::new(
                ContactField::Name,
                match err {
                    ContactNameError::LenCharMinViolated => TooShort {
                        min: ContactName::MIN_LENGTH,
                    },
                    ContactNameError::LenCharMaxViolated => TooLong {
                        max: ContactName::MAX_LENGTH,
                    },
                    ContactNameError::RegexViolated => InvalidCharacters,
                },
            )
        })?;

        let email = input.email.into_text(ContactField::Email)?;
        let email = ContactEmail::try_new(email)
            .ok()
            .and_then(|email| email.parse::<EmailAddress>().ok())
            .ok_or(ContactValidationError::new(ContactField::Email, InvalidFormat))?;

        let message = input.message.into_text(ContactField::Message)?;
        let message = ContactMessageContent::try_new(message).map_err(|err| {
            ContactValidationError::new(
                ContactField::Message,
                match err {
                    ContactMessageContentError::LenCharMinViolated => TooShort {
                        min: ContactMessageContent::MIN_LENGTH,
                    },
                    ContactMessageContentError::LenCharMaxViolated => TooLong {
                        max: ContactMessageContent::MAX_LENGTH,
                    },
                },
            )
        })?;

        Ok(Self {
            name,
            email,
            message,
        })
    }
}

impl ContactFieldInput {
    fn into_text(self, field: ContactField) -> Result<String, ContactValidationError> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Missing => Err(ContactValidationError::new(
                field,
                ContactValidationReason::Missing,
            )),
            Self::WrongType => Err(ContactValidationError::new(
                field,
                ContactValidationReason::WrongType,
            )),
        }
    }
}
