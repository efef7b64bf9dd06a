use std::time::Duration;

use super::errors::OAuth2Error;

pub(super) fn get_client() -> Result<reqwest::Client, OAuth2Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(32)
        .build()
        .map_err(|e| OAuth2Error::TokenEndpoint(format!("Failed to create reqwest client: {e}")))
}
