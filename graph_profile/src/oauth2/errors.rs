use thiserror::Error;

use crate::utils::UtilError;

use super::discovery::OidcDiscoveryError;
use super::types::{ErrorCode, ErrorResult};

#[derive(Debug, Error, Clone)]
pub enum OAuth2Error {
    /// Error response from the identity provider, kept verbatim
    #[error("Provider error: {0}")]
    Provider(ErrorResult),

    #[error("No sign-in flow in progress for this session")]
    NoFlowInProgress,

    #[error("State mismatch")]
    StateMismatch,

    #[error("Nonce mismatch")]
    NonceMismatch,

    #[error("Missing authorization code")]
    MissingCode,

    #[error("Id token error: {0}")]
    IdToken(String),

    #[error("No token cached for the signed-in user")]
    NoTokenCached,

    #[error("Discovery error: {0}")]
    Discovery(#[from] OidcDiscoveryError),

    #[error("Token endpoint error: {0}")]
    TokenEndpoint(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}

impl OAuth2Error {
    /// The `{error, error_description}` record for errors the user should see.
    ///
    /// Returns `None` for faults (transport, discovery, crypto), which are not
    /// rendered as an authentication result.
    pub fn into_error_result(self) -> Option<ErrorResult> {
        let code = match &self {
            Self::Provider(result) => return Some(result.clone()),
            Self::NoFlowInProgress
            | Self::StateMismatch
            | Self::NonceMismatch
            | Self::MissingCode
            | Self::IdToken(_) => "invalid_grant",
            Self::NoTokenCached => "login_required",
            Self::Discovery(_) | Self::TokenEndpoint(_) | Self::InvalidUrl(_) | Self::Utils(_) => {
                return None;
            }
        };
        Some(ErrorResult {
            error: ErrorCode::Code(code.to_string()),
            error_description: self.to_string(),
        })
    }
}
