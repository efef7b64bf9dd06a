use http::Method;

use crate::oauth2::AccessToken;

use super::errors::DirectoryError;
use super::types::{DirectoryRequest, ProfilePatch};

fn endpoint_url(endpoint: &str, path: &str) -> String {
    format!("{}/{}", endpoint.trim_end_matches('/'), path)
}

/// `GET /me`: profile of the signed-in user
pub fn get_me(endpoint: &str, bearer: AccessToken) -> DirectoryRequest {
    DirectoryRequest {
        method: Method::GET,
        url: endpoint_url(endpoint, "me"),
        bearer,
        body: None,
    }
}

/// `PATCH /users/{id}` with the editable profile fields
pub fn update_user(
    endpoint: &str,
    bearer: AccessToken,
    id: &str,
    patch: &ProfilePatch,
) -> Result<DirectoryRequest, DirectoryError> {
    Ok(DirectoryRequest {
        method: Method::PATCH,
        url: endpoint_url(endpoint, &format!("users/{}", urlencoding::encode(id))),
        bearer,
        body: Some(serde_json::to_value(patch)?),
    })
}

/// `GET /users`: first page of directory users
pub fn list_users(endpoint: &str, bearer: AccessToken) -> DirectoryRequest {
    DirectoryRequest {
        method: Method::GET,
        url: endpoint_url(endpoint, "users"),
        bearer,
        body: None,
    }
}
