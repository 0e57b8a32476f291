//! Response envelopes shared by every endpoint.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Plain acknowledgment body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One rejected request field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub message: String,
    pub field: String,
    /// Where the field came from: `body`, `query` or `params`.
    pub location: String,
}

/// Error body: `{message, errors?, reference?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,

    /// Opaque id logged next to the underlying failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<Uuid>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: None,
            reference: None,
        }
    }

    pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn with_reference(mut self, reference: Uuid) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Flatten `validator` output into field errors, ordered by field name.
    pub fn validation(errors: &ValidationErrors, location: &str) -> Self {
        let mut fields: Vec<FieldError> = errors
            .errors()
            .iter()
            .flat_map(|(field, kind)| match kind {
                ValidationErrorsKind::Field(list) => list
                    .iter()
                    .map(|e| FieldError {
                        message: e
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("Invalid value for {field}")),
                        field: field.to_string(),
                        location: location.to_string(),
                    })
                    .collect::<Vec<_>>(),
                _ => Vec::new(),
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));

        Self::new("Validation failed").with_errors(fields)
    }
}
