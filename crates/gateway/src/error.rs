//! Structured collaborator failures.
//!
//! Persistence collaborators fail with up to three layers of detail: row-level
//! errors, field-level errors keyed by field API name, and a generic message.
//! The surfaced message always prefers the most specific layer available.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error code reported when deleting an entity that is already gone.
pub const ENTITY_IS_DELETED: &str = "ENTITY_IS_DELETED";

/// One structured error entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    pub error_code: Option<String>,
}

impl ErrorDetail {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_code: None,
        }
    }

    pub fn with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_code: Some(code.into()),
        }
    }
}

/// Failure reported by a collaborator call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{}", self.surfaced_message())]
pub struct GatewayError {
    /// Generic message (least specific).
    pub message: Option<String>,
    /// Row-level errors (most specific).
    pub row_errors: Vec<ErrorDetail>,
    /// Field-level errors, keyed by field API name.
    pub field_errors: BTreeMap<String, Vec<ErrorDetail>>,
}

impl GatewayError {
    pub fn generic(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn row(message: impl Into<String>) -> Self {
        Self {
            row_errors: vec![ErrorDetail::new(message)],
            ..Self::default()
        }
    }

    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut field_errors = BTreeMap::new();
        field_errors.insert(field.into(), vec![ErrorDetail::new(message)]);
        Self {
            field_errors,
            ..Self::default()
        }
    }

    /// The failure a deletion gets when its target is already gone.
    pub fn entity_deleted() -> Self {
        Self {
            row_errors: vec![ErrorDetail::with_code(
                "entity is deleted",
                ENTITY_IS_DELETED,
            )],
            ..Self::default()
        }
    }

    /// Most specific message available: first row-level error, then first
    /// field-level error, then the generic message, then a fallback.
    pub fn surfaced_message(&self) -> String {
        if let Some(detail) = self.row_errors.first() {
            return detail.message.clone();
        }
        if let Some(detail) = self.field_errors.values().next().and_then(|v| v.first()) {
            return detail.message.clone();
        }
        self.message
            .clone()
            .unwrap_or_else(|| "An unexpected error occurred".to_string())
    }

    /// True when the failure means the target entity was already deleted.
    pub fn is_entity_deleted(&self) -> bool {
        self.row_errors
            .first()
            .and_then(|d| d.error_code.as_deref())
            .is_some_and(|code| code == ENTITY_IS_DELETED)
    }
}
