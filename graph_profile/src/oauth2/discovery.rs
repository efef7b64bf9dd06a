use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// OIDC Discovery Document as defined by OpenID Connect Discovery 1.0 specification
/// https://openid.net/specs/openid-connect-discovery-1_0.html
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OidcDiscoveryDocument {
    /// The issuer identifier for the OpenID Provider
    pub issuer: String,
    /// URL of the OAuth 2.0 Authorization Endpoint
    pub authorization_endpoint: String,
    /// URL of the OAuth 2.0 Token Endpoint
    pub token_endpoint: String,
    /// URL at which the RP can redirect the user to sign out
    pub end_session_endpoint: Option<String>,
    pub userinfo_endpoint: Option<String>,
    pub jwks_uri: Option<String>,
    pub scopes_supported: Option<Vec<String>>,
}

/// Errors that can occur during OIDC discovery
#[derive(Error, Debug, Clone)]
pub enum OidcDiscoveryError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),
    #[error("HTTP status error: {0}")]
    HttpStatusError(reqwest::StatusCode),
    #[error("JSON parsing failed: {0}")]
    JsonError(String),
}

impl From<reqwest::Error> for OidcDiscoveryError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpError(err.to_string())
    }
}

/// Candidate discovery URLs for an authority.
///
/// Microsoft authorities (`https://login.microsoftonline.com/{tenant}`) publish
/// the v2.0 document under `/v2.0`; plain OIDC issuers publish it at the root.
pub(crate) fn discovery_urls(authority: &str) -> [String; 2] {
    let authority = authority.trim_end_matches('/');
    [
        format!("{authority}/v2.0/.well-known/openid-configuration"),
        format!("{authority}/.well-known/openid-configuration"),
    ]
}

/// Fetch the OIDC discovery document for an authority, trying each
/// well-known location in turn.
pub(crate) async fn fetch_oidc_discovery(
    authority: &str,
) -> Result<OidcDiscoveryDocument, OidcDiscoveryError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let mut last_error = None;
    for discovery_url in discovery_urls(authority) {
        tracing::debug!("Fetching OIDC discovery from: {}", discovery_url);

        let response = client.get(&discovery_url).send().await?;
        if !response.status().is_success() {
            tracing::debug!(
                "OIDC discovery at {} failed with status: {}",
                discovery_url,
                response.status()
            );
            last_error = Some(OidcDiscoveryError::HttpStatusError(response.status()));
            continue;
        }

        let document: OidcDiscoveryDocument = response
            .json()
            .await
            .map_err(|e| OidcDiscoveryError::JsonError(e.to_string()))?;

        // Multi-tenant authorities advertise a templated issuer
        // (`.../{tenantid}/v2.0`), so the issuer is logged rather than compared.
        tracing::debug!("Discovered issuer: {}", document.issuer);
        tracing::debug!(
            "Authorization endpoint: {}",
            document.authorization_endpoint
        );
        tracing::debug!("Token endpoint: {}", document.token_endpoint);

        return Ok(document);
    }

    let error = last_error.unwrap_or_else(|| {
        OidcDiscoveryError::HttpError("No discovery location".to_string())
    });
    tracing::error!("OIDC discovery failed for {}: {}", authority, error);
    Err(error)
}
