//! The JSON envelope every response body is wrapped in.
//!
//! Two shapes go over the wire:
//!
//! ```text
//! {"status":"success","data":{...}|null,"message":"..."}
//! {"error":{"code":"","message":"","details":"","validationErrors":[...]}}
//! ```
//!
//! Both wrappers are always emitted, even when empty. Writing an envelope to
//! a [`Response`](crate::Response) is done by [`Response::envelope`](crate::Response::envelope)
//! or by returning `(StatusCode, envelope)` from a handler.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Success ───────────────────────────────────────────────────────────────────

/// `{"status":"success","data":...,"message":...}`
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SuccessResponse {
    pub status: String,
    pub data: Option<Map<String, Value>>,
    pub message: String,
}

impl SuccessResponse {
    /// A success envelope without data. `data` serializes as `null`.
    pub fn new(message: impl Into<String>) -> Self {
        Self { status: "success".to_owned(), data: None, message: message.into() }
    }

    pub fn with_data(data: Map<String, Value>, message: impl Into<String>) -> Self {
        Self { status: "success".to_owned(), data: Some(data), message: message.into() }
    }
}

// ── Error ─────────────────────────────────────────────────────────────────────

/// One field-level problem inside an [`ErrorResponse`].
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub field: String,
    pub message: String,
}

impl Validation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

/// The object under the `"error"` key.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub details: String,
    pub validation_errors: Vec<Validation>,
}

/// `{"error":{...}}`
///
/// Also a regular error type, so extractors can hand it back through `?`:
/// its `Display` is the error message.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

impl ErrorResponse {
    /// Message only. `code` and `details` are empty, no validations.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody { message: message.into(), ..ErrorBody::default() },
        }
    }

    /// Message plus the cause's display text as `details`.
    pub fn from_cause(message: impl Into<String>, cause: &dyn std::error::Error) -> Self {
        Self {
            error: ErrorBody {
                message: message.into(),
                details: cause.to_string(),
                ..ErrorBody::default()
            },
        }
    }

    /// Every field spelled out. `code` is usually an HTTP status number.
    pub fn detailed(
        code: impl fmt::Display,
        message: impl Into<String>,
        details: impl Into<String>,
        validations: Vec<Validation>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.to_string(),
                message: message.into(),
                details: details.into(),
                validation_errors: validations,
            },
        }
    }

    /// Appends one validation. Validations keep their append order.
    pub fn add_validation(
        &mut self,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> &mut Self {
        self.error.validation_errors.push(Validation::new(field, message));
        self
    }

    pub fn message(&self) -> &str {
        &self.error.message
    }

    pub fn validations(&self) -> &[Validation] {
        &self.error.validation_errors
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.error.message)
    }
}

impl std::error::Error for ErrorResponse {}
