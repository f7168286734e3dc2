use chrono::{DateTime, Utc};
use portfolio_models::contact::{ContactFieldInput, ContactSubmissionInput};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw contact form submission.
///
/// Fields are kept as arbitrary json values so that missing fields and fields
/// of the wrong type can be reported individually during validation.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiContactSubmission {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
}

impl From<ApiContactSubmission> for ContactSubmissionInput {
    fn from(value: ApiContactSubmission) -> Self {
        Self {
            name: field_input(value.name),
            email: field_input(value.email),
            message: field_input(value.message),
        }
    }
}

fn field_input(value: Option<Value>) -> ContactFieldInput {
    match value {
        None | Some(Value::Null) => ContactFieldInput::Missing,
        Some(Value::String(text)) => ContactFieldInput::Text(text),
        Some(_) => ContactFieldInput::WrongType,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiContactSuccess {
    pub success: bool,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
    pub message_id: String,
}

#[derive(Debug, Serialize)]
pub struct ApiContactDispatchError {
    pub success: bool,
    pub error: String,
    pub code: &'static str,
    pub timestamp: DateTime<Utc>,
}
