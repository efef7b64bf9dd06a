use thiserror::Error;

use crate::directory::DirectoryError;
use crate::oauth2::OAuth2Error;
use crate::session::SessionError;
use crate::storage::StorageError;

/// Faults while coordinating a request.
///
/// Rejections the user should see (provider errors, missing sign-in, upstream
/// error statuses) never land here; they are rendered as a `Page::AuthError`.
#[derive(Error, Debug)]
pub enum CoordinationError {
    /// Error from OAuth2 operations
    #[error("OAuth2 error: {0}")]
    OAuth2Error(OAuth2Error),

    /// Error from Session operations
    #[error("Session error: {0}")]
    SessionError(SessionError),

    /// Error talking to the directory API
    #[error("Directory error: {0}")]
    DirectoryError(DirectoryError),

    #[error("Storage error: {0}")]
    StorageError(StorageError),
}

impl CoordinationError {
    /// Log the error and return self
    pub fn log(self) -> Self {
        match &self {
            Self::OAuth2Error(err) => tracing::error!("OAuth2 error: {}", err),
            Self::SessionError(err) => tracing::error!("Session error: {}", err),
            Self::DirectoryError(err) => tracing::error!("Directory error: {}", err),
            Self::StorageError(err) => tracing::error!("Storage error: {}", err),
        }
        self
    }
}

// Custom From implementations that automatically log errors

impl From<OAuth2Error> for CoordinationError {
    fn from(err: OAuth2Error) -> Self {
        Self::OAuth2Error(err).log()
    }
}

impl From<SessionError> for CoordinationError {
    fn from(err: SessionError) -> Self {
        Self::SessionError(err).log()
    }
}

impl From<DirectoryError> for CoordinationError {
    fn from(err: DirectoryError) -> Self {
        Self::DirectoryError(err).log()
    }
}

impl From<StorageError> for CoordinationError {
    fn from(err: StorageError) -> Self {
        Self::StorageError(err).log()
    }
}
