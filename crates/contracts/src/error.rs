//! Layered error definitions
//!
//! Categorized by source: config / lookup / validation / persistence

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Lookup Errors =====
    /// Referenced entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    // ===== Input Errors =====
    /// Missing or out-of-range field
    #[error("invalid '{field}': {message}")]
    Validation { field: String, message: String },

    // ===== Persistence Errors =====
    /// Transaction or write failure
    #[error("store '{store}' persistence error: {message}")]
    Persistence { store: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create not-found error for a user
    pub fn user_not_found(id: i64) -> Self {
        Self::NotFound { entity: "user", id }
    }

    /// Create not-found error for a panic event
    pub fn event_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "panic event",
            id,
        }
    }

    /// Create input validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create persistence error
    pub fn persistence(store: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Persistence {
            store: store.into(),
            message: message.into(),
        }
    }

    /// Whether this is a `NotFound` error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<validator::ValidationErrors> for ContractError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Self::Validation {
            field,
            message: errors.to_string(),
        }
    }
}
