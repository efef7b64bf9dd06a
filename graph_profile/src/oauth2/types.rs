use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Scopes the identity platform adds to every sign-in request
pub(crate) const RESERVED_SCOPES: [&str; 3] = ["openid", "profile", "offline_access"];

/// Error code of an `{error, error_description}` record.
///
/// Identity provider errors carry a string code, upstream directory errors
/// often carry only an HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Status(u16),
    Code(String),
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(status) => write!(f, "{status}"),
            Self::Code(code) => f.write_str(code),
        }
    }
}

impl From<u16> for ErrorCode {
    fn from(status: u16) -> Self {
        Self::Status(status)
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        Self::Code(code.to_string())
    }
}

/// The record rendered by the error view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResult {
    pub error: ErrorCode,
    pub error_description: String,
}

impl ErrorResult {
    pub fn new(error: impl Into<ErrorCode>, error_description: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            error_description: error_description.into(),
        }
    }
}

impl fmt::Display for ErrorResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.error_description)
    }
}

/// Claims of the signed-in identity, taken from the ID token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdClaims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    /// Directory object id of the user (Microsoft identity platform)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Pending authorization-code flow, kept in the session between `/login`
/// and the callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthFlow {
    pub state: String,
    pub nonce: String,
    pub code_verifier: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Tokens cached in the session for the signed-in user
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenCache {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    /// Scopes granted to `access_token`
    pub scopes: Vec<String>,
}

impl fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCache")
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("expires_at", &self.expires_at)
            .field("scopes", &self.scopes)
            .finish()
    }
}

impl TokenCache {
    pub(crate) fn expires_within(&self, skew: Duration) -> bool {
        self.expires_at - skew <= Utc::now()
    }

    /// Whether every requested scope was granted to the cached token.
    ///
    /// Granted scopes may come back fully qualified
    /// (`https://graph.microsoft.com/User.Read`).
    pub(crate) fn covers(&self, requested: &[String]) -> bool {
        requested
            .iter()
            .filter(|s| !RESERVED_SCOPES.contains(&s.as_str()))
            .all(|wanted| {
                self.scopes.iter().any(|granted| {
                    granted.eq_ignore_ascii_case(wanted)
                        || granted
                            .rsplit_once('/')
                            .is_some_and(|(_, short)| short.eq_ignore_ascii_case(wanted))
                })
            })
    }
}

/// Bearer credential for outbound directory calls
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Redirect instructions returned by begin-login
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRedirect {
    pub auth_uri: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct OidcTokenResponse {
    pub(super) access_token: String,
    #[allow(dead_code)]
    pub(super) token_type: Option<String>,
    pub(super) expires_in: Option<i64>,
    pub(super) refresh_token: Option<String>,
    pub(super) scope: Option<String>,
    pub(super) id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OidcErrorResponse {
    pub(super) error: String,
    #[serde(default)]
    pub(super) error_description: String,
}
