//! Error types for the wedplan system.

use thiserror::Error;

/// Reasons a request conflicts with the current state of the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConflictKind {
    #[error("client already has an active order")]
    ActiveOrderExists,

    #[error("wedding date is already booked")]
    DateUnavailable,

    #[error("email is already registered")]
    EmailTaken,

    #[error("cannot {event} an order in state {from}")]
    InvalidTransition { from: String, event: String },
}

#[derive(Debug, Error)]
pub enum WedplanError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Conflict: {0}")]
    Conflict(ConflictKind),

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WedplanError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

impl From<ConflictKind> for WedplanError {
    fn from(kind: ConflictKind) -> Self {
        Self::Conflict(kind)
    }
}

pub type WedplanResult<T> = Result<T, WedplanError>;
