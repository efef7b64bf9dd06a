use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use subtle::ConstantTimeEq;
use tokio::sync::OnceCell;
use url::Url;

use crate::config::AppConfig;
use crate::session::SessionData;
use crate::utils::{gen_random_string, pkce_challenge};

use super::authenticator::Authenticator;
use super::discovery::{OidcDiscoveryDocument, fetch_oidc_discovery};
use super::errors::OAuth2Error;
use super::idtoken::decode_id_token;
use super::types::{
    AccessToken, AuthFlow, ErrorCode, ErrorResult, IdClaims, LoginRedirect, OidcErrorResponse,
    OidcTokenResponse, RESERVED_SCOPES, TokenCache,
};
use super::utils::get_client;

/// Tokens this close to expiry are renewed before use
const EXPIRY_SKEW_SECS: i64 = 300;
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Authorization-code client for the Microsoft identity platform or any OIDC issuer
pub struct OidcAuth {
    authority: String,
    client_id: String,
    client_secret: String,
    client: reqwest::Client,
    discovery: OnceCell<OidcDiscoveryDocument>,
}

impl OidcAuth {
    pub fn new(config: &AppConfig) -> Result<Self, OAuth2Error> {
        Ok(Self {
            authority: config.authority.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            client: get_client()?,
            discovery: OnceCell::new(),
        })
    }

    async fn endpoints(&self) -> Result<&OidcDiscoveryDocument, OAuth2Error> {
        let document = self
            .discovery
            .get_or_try_init(|| fetch_oidc_discovery(&self.authority))
            .await?;
        Ok(document)
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<OidcTokenResponse, OAuth2Error> {
        let endpoints = self.endpoints().await?;
        let response = self
            .client
            .post(&endpoints.token_endpoint)
            .form(form)
            .send()
            .await
            .map_err(|e| OAuth2Error::TokenEndpoint(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OAuth2Error::TokenEndpoint(e.to_string()))?;

        if !status.is_success() {
            tracing::error!("Token endpoint returned {}", status);
            return match serde_json::from_str::<OidcErrorResponse>(&body) {
                Ok(err) => Err(OAuth2Error::Provider(ErrorResult::new(
                    ErrorCode::Code(err.error),
                    err.error_description,
                ))),
                Err(_) => Err(OAuth2Error::TokenEndpoint(format!(
                    "Unexpected status {status}"
                ))),
            };
        }

        serde_json::from_str(&body).map_err(|e| {
            OAuth2Error::TokenEndpoint(format!("Failed to deserialize token response: {e}"))
        })
    }
}

/// Space separated scope parameter: requested scopes plus the reserved OIDC scopes
fn scope_param(scopes: &[String]) -> String {
    let mut all: Vec<&str> = Vec::new();
    for scope in scopes
        .iter()
        .map(String::as_str)
        .chain(RESERVED_SCOPES.iter().copied())
    {
        if !all.contains(&scope) {
            all.push(scope);
        }
    }
    all.join(" ")
}

fn cache_from_response(
    response: &OidcTokenResponse,
    requested: &[String],
    previous_refresh_token: Option<String>,
) -> TokenCache {
    let expires_in = response.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
    let scopes = match &response.scope {
        Some(granted) => granted.split_whitespace().map(str::to_string).collect(),
        None => requested.to_vec(),
    };
    TokenCache {
        access_token: response.access_token.clone(),
        refresh_token: response.refresh_token.clone().or(previous_refresh_token),
        expires_at: Utc::now() + Duration::seconds(expires_in),
        scopes,
    }
}

#[async_trait]
impl Authenticator for OidcAuth {
    #[tracing::instrument(skip(self, session))]
    async fn log_in(
        &self,
        session: &mut SessionData,
        scopes: &[String],
        redirect_uri: &str,
        prompt: Option<&str>,
    ) -> Result<LoginRedirect, OAuth2Error> {
        let state = gen_random_string(16)?;
        let nonce = gen_random_string(16)?;
        let code_verifier = gen_random_string(32)?;
        let code_challenge = pkce_challenge(&code_verifier);

        let endpoints = self.endpoints().await?;
        let mut auth_uri = Url::parse(&endpoints.authorization_endpoint)
            .map_err(|e| OAuth2Error::InvalidUrl(e.to_string()))?;
        {
            let mut query = auth_uri.query_pairs_mut();
            query
                .append_pair("client_id", &self.client_id)
                .append_pair("response_type", "code")
                .append_pair("redirect_uri", redirect_uri)
                .append_pair("scope", &scope_param(scopes))
                .append_pair("state", &state)
                .append_pair("nonce", &nonce)
                .append_pair("code_challenge", &code_challenge)
                .append_pair("code_challenge_method", "S256");
            if let Some(prompt) = prompt {
                query.append_pair("prompt", prompt);
            }
        }

        session.auth_flow = Some(AuthFlow {
            state,
            nonce,
            code_verifier,
            redirect_uri: redirect_uri.to_string(),
            scopes: scopes.to_vec(),
            created_at: Utc::now(),
        });

        tracing::debug!("Auth URL: {}", auth_uri);
        Ok(LoginRedirect {
            auth_uri: auth_uri.into(),
        })
    }

    #[tracing::instrument(skip_all)]
    async fn complete_log_in(
        &self,
        session: &mut SessionData,
        params: &HashMap<String, String>,
    ) -> Result<IdClaims, OAuth2Error> {
        // The pending flow is single use, whatever the outcome
        let flow = session.auth_flow.take();

        if let Some(error) = params.get("error") {
            tracing::debug!("Provider returned error: {}", error);
            return Err(OAuth2Error::Provider(ErrorResult::new(
                ErrorCode::Code(error.clone()),
                params.get("error_description").cloned().unwrap_or_default(),
            )));
        }

        let flow = flow.ok_or(OAuth2Error::NoFlowInProgress)?;

        let state_ok = params
            .get("state")
            .is_some_and(|state| bool::from(state.as_bytes().ct_eq(flow.state.as_bytes())));
        if !state_ok {
            tracing::error!("State in response: {:?}", params.get("state"));
            return Err(OAuth2Error::StateMismatch);
        }

        let code = params.get("code").ok_or(OAuth2Error::MissingCode)?;
        let scope = scope_param(&flow.scopes);
        let response = self
            .token_request(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", &flow.redirect_uri),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
                ("code_verifier", &flow.code_verifier),
                ("scope", &scope),
            ])
            .await?;

        let id_token = response.id_token.as_deref().ok_or_else(|| {
            OAuth2Error::IdToken("ID token not present in response".to_string())
        })?;
        let claims = decode_id_token(id_token, &self.client_id, &flow.nonce)?;

        session.user = Some(claims.clone());
        session.tokens = Some(cache_from_response(&response, &flow.scopes, None));

        tracing::debug!("Signed in subject {}", claims.sub);
        Ok(claims)
    }

    #[tracing::instrument(skip(self, session))]
    async fn log_out(
        &self,
        session: &mut SessionData,
        post_logout_redirect: &str,
    ) -> Result<String, OAuth2Error> {
        session.user = None;
        session.tokens = None;
        session.auth_flow = None;

        let end_session = match self.endpoints().await {
            Ok(document) => document.end_session_endpoint.clone(),
            Err(e) => {
                tracing::warn!("Falling back to default logout endpoint: {}", e);
                None
            }
        }
        .unwrap_or_else(|| format!("{}/oauth2/v2.0/logout", self.authority));

        let mut logout_url =
            Url::parse(&end_session).map_err(|e| OAuth2Error::InvalidUrl(e.to_string()))?;
        logout_url
            .query_pairs_mut()
            .append_pair("post_logout_redirect_uri", post_logout_redirect);

        Ok(logout_url.into())
    }

    fn get_user(&self, session: &SessionData) -> Option<IdClaims> {
        session.user.clone()
    }

    #[tracing::instrument(skip(self, session))]
    async fn get_token_for_user(
        &self,
        session: &mut SessionData,
        scopes: &[String],
    ) -> Result<AccessToken, OAuth2Error> {
        let cached = session.tokens.as_ref().ok_or(OAuth2Error::NoTokenCached)?;

        if cached.covers(scopes) && !cached.expires_within(Duration::seconds(EXPIRY_SKEW_SECS)) {
            return Ok(AccessToken::new(cached.access_token.clone()));
        }

        let refresh_token = cached.refresh_token.clone().ok_or_else(|| {
            tracing::debug!("Cached token unusable and no refresh token");
            OAuth2Error::NoTokenCached
        })?;

        tracing::debug!("Renewing access token with refresh token");
        let scope = scope_param(scopes);
        let response = self
            .token_request(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", &refresh_token),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
                ("scope", &scope),
            ])
            .await?;

        let renewed = cache_from_response(&response, scopes, Some(refresh_token));
        let token = AccessToken::new(renewed.access_token.clone());
        session.tokens = Some(renewed);
        Ok(token)
    }
}
