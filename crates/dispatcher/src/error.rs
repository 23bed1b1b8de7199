//! Dispatcher error types

use contracts::ContractError;
use thiserror::Error;

/// Caller-facing failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Persistence,
}

impl ErrorKind {
    /// Label used for logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Validation => "validation",
            Self::Persistence => "persistence",
        }
    }
}

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Unknown user or event
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// Rejected input
    #[error("invalid '{field}': {message}")]
    Validation { field: String, message: String },

    /// Store failure, the in-flight transaction was rolled back
    #[error("store '{store}' failed, transaction rolled back: {message}")]
    Persistence { store: String, message: String },

    /// Store creation error
    #[error("failed to open store '{name}': {message}")]
    StoreCreation { name: String, message: String },

    /// Other contract error
    #[error("contract error: {0}")]
    Contract(ContractError),
}

impl DispatcherError {
    /// Create a user-not-found error
    pub fn user_not_found(id: i64) -> Self {
        Self::NotFound { entity: "user", id }
    }

    /// Create an event-not-found error
    pub fn event_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "panic event",
            id,
        }
    }

    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a store creation error
    pub fn store_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StoreCreation {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Wrap a store error that aborted a transaction
    ///
    /// Lookup and input errors keep their category.
    pub fn from_store(store: &str, err: ContractError) -> Self {
        match err {
            ContractError::Persistence { message, .. } => Self::Persistence {
                store: store.to_string(),
                message,
            },
            ContractError::Io(e) => Self::Persistence {
                store: store.to_string(),
                message: e.to_string(),
            },
            other => other.into(),
        }
    }

    /// Failure category
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Persistence { .. } | Self::StoreCreation { .. } | Self::Contract(_) => {
                ErrorKind::Persistence
            }
        }
    }
}

impl From<ContractError> for DispatcherError {
    fn from(err: ContractError) -> Self {
        match err {
            ContractError::NotFound { entity, id } => Self::NotFound { entity, id },
            ContractError::Validation { field, message }
            | ContractError::ConfigValidation { field, message } => {
                Self::Validation { field, message }
            }
            ContractError::Persistence { store, message } => Self::Persistence { store, message },
            other => Self::Contract(other),
        }
    }
}
