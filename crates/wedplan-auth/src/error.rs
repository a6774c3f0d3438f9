//! Authentication error types.

use thiserror::Error;
use wedplan_core::error::WedplanError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("no token provided")]
    MissingToken,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for WedplanError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_) => WedplanError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::Crypto(msg) => WedplanError::Crypto(msg),
        }
    }
}
