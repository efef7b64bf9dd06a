use async_trait::async_trait;
use std::collections::HashMap;

use crate::session::SessionData;

use super::errors::OAuth2Error;
use super::types::{AccessToken, IdClaims, LoginRedirect};

/// The identity collaborator consumed by the route coordination.
///
/// All state transitions (unauthenticated, pending, authenticated) happen on
/// the `SessionData` handed in for the current request.
#[async_trait]
pub trait Authenticator: Send + Sync + 'static {
    /// Begin an authorization-code flow and return where to send the browser.
    async fn log_in(
        &self,
        session: &mut SessionData,
        scopes: &[String],
        redirect_uri: &str,
        prompt: Option<&str>,
    ) -> Result<LoginRedirect, OAuth2Error>;

    /// Complete the flow with the parameters the provider redirected back with.
    async fn complete_log_in(
        &self,
        session: &mut SessionData,
        params: &HashMap<String, String>,
    ) -> Result<IdClaims, OAuth2Error>;

    /// Forget the signed-in identity and return the provider logout URL.
    async fn log_out(
        &self,
        session: &mut SessionData,
        post_logout_redirect: &str,
    ) -> Result<String, OAuth2Error>;

    fn get_user(&self, session: &SessionData) -> Option<IdClaims>;

    /// Access token for the scopes, renewing it from the refresh token when needed.
    async fn get_token_for_user(
        &self,
        session: &mut SessionData,
        scopes: &[String],
    ) -> Result<AccessToken, OAuth2Error>;
}
