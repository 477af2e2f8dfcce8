use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Discriminator the server puts on field-level validation failures.
pub const VALIDATION_ERROR_CODE: &str = "VALIDATION_ERROR";

/// Field name to the single message shown next to that input.
///
/// Keys are wire field names (`firstName`, `postalCode`, ...). Insertion order
/// is kept so messages render in the order the validators ran.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(IndexMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the message for a field, replacing any previous one.
    pub fn set(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.shift_remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overwrites this map's slots with every entry of `other`.
    pub fn overwrite_with(&mut self, other: FieldErrors) {
        for (field, message) in other.0 {
            self.0.insert(field, message);
        }
    }
}

impl FromIterator<(String, String)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Structured validation errors with field-level error mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidationErrors {
    Single { field: String, message: String },
    Multiple { fields: FieldErrors },
}

impl ValidationErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Single {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Flattens into a field map.
    pub fn into_field_errors(self) -> FieldErrors {
        match self {
            Self::Single { field, message } => std::iter::once((field, message)).collect(),
            Self::Multiple { fields } => fields,
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single { field, message } => write!(f, "{}: {}", field, message),
            Self::Multiple { fields } => {
                let joined: Vec<String> = fields
                    .iter()
                    .map(|(field, message)| format!("{}: {}", field, message))
                    .collect();
                write!(f, "{}", joined.join("; "))
            }
        }
    }
}

/// Body of a `400` validation response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiValidationError {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<IndexMap<String, Vec<String>>>,
}

impl ApiValidationError {
    pub fn new(message: impl Into<String>, errors: IndexMap<String, Vec<String>>) -> Self {
        Self {
            code: VALIDATION_ERROR_CODE.to_string(),
            message: message.into(),
            errors: Some(errors),
        }
    }

    /// First message per field; fields with an empty message list are skipped.
    pub fn field_errors(&self) -> FieldErrors {
        self.errors
            .iter()
            .flatten()
            .filter_map(|(field, messages)| {
                messages.first().map(|message| (field.clone(), message.clone()))
            })
            .collect()
    }
}

/// The custom error type for the client.
#[derive(Debug, Error)]
pub enum Error {
    /// Client-side validation failed; nothing was sent.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The server rejected the payload with field-level errors.
    #[error("{}", .0.message)]
    ServerValidation(ApiValidationError),

    /// The requested record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Non-2xx response without a field map.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// The request was sent but no response was received.
    #[error("Network error - no response received: {0}")]
    Network(String),

    /// The request could not be constructed or sent.
    #[error("Error setting up the request: {0}")]
    Setup(String),

    /// Form state that cannot be translated to the wire shape.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// A type alias for `Result<T, Error>` to simplify function signatures.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Field errors carried by this error, if it is field-scoped.
    pub fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            Error::Validation(errors) => Some(errors.clone().into_field_errors()),
            Error::ServerValidation(body) => {
                let fields = body.field_errors();
                (!fields.is_empty()).then_some(fields)
            }
            _ => None,
        }
    }

    /// Text for a global notification.
    pub fn user_message(&self) -> String {
        match self {
            Error::Server { message, .. } => message.clone(),
            Error::ServerValidation(body) => body.message.clone(),
            Error::NotFound(message) if !message.trim().is_empty() => message.clone(),
            Error::NotFound(_) => "Patient not found".to_string(),
            Error::Network(_) => "Network error - no response received".to_string(),
            Error::Setup(_) => "Error setting up the request".to_string(),
            other => other.to_string(),
        }
    }
}
