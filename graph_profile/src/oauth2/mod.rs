mod authenticator;
mod core;
mod discovery;
mod errors;
mod idtoken;
mod types;
mod utils;

pub use authenticator::Authenticator;
pub use self::core::OidcAuth;
pub use discovery::{OidcDiscoveryDocument, OidcDiscoveryError};
pub use errors::OAuth2Error;
pub use types::{
    AccessToken, AuthFlow, ErrorCode, ErrorResult, IdClaims, LoginRedirect, TokenCache,
};
