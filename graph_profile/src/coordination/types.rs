use serde::Deserialize;
use serde_json::Value;

use crate::oauth2::{ErrorResult, IdClaims};

/// What a route renders
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    /// Sign-in page linking to the provider
    Login { auth_uri: String },
    Home { user: IdClaims },
    /// Profile of the signed-in user; `result` is the status of the fetch
    /// that produced `user`, absent after an update
    Profile { user: Value, result: Option<u16> },
    Users { result: Value },
    AuthError { result: ErrorResult },
    Redirect { location: String },
}

/// Form posted to `/profile`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "mobilePhone")]
    pub mobile_phone: Option<String>,
    #[serde(rename = "businessPhone")]
    pub business_phone: Option<String>,
}
