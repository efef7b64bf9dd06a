use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::oauth2::AccessToken;

/// A single call to the directory REST API
#[derive(Debug, Clone)]
pub struct DirectoryRequest {
    pub method: Method,
    pub url: String,
    pub bearer: AccessToken,
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Body of a 2xx response, or the upstream error
pub type GraphOutcome = Result<Value, GraphError>;

impl DirectoryResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Tag the response: `expected` status gives the JSON body (`null` when
    /// empty), anything else a `GraphError`.
    pub fn outcome(&self, expected: StatusCode) -> GraphOutcome {
        if self.status != expected {
            return Err(GraphError::from_response(self));
        }
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&self.body).map_err(|e| {
            tracing::error!("Unreadable directory response body: {}", e);
            GraphError {
                status: self.status,
                code: None,
                message: None,
            }
        })
    }
}

/// Error reported by the directory API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphError {
    pub status: StatusCode,
    pub code: Option<String>,
    pub message: Option<String>,
}

#[derive(Deserialize)]
struct GraphErrorBody {
    error: GraphErrorDetail,
}

#[derive(Deserialize)]
struct GraphErrorDetail {
    code: Option<String>,
    message: Option<String>,
}

impl GraphError {
    /// Parse `{"error": {"code", "message"}}`; other bodies give a bare status
    pub fn from_response(response: &DirectoryResponse) -> Self {
        let detail = serde_json::from_str::<GraphErrorBody>(&response.body)
            .ok()
            .map(|body| body.error);
        Self {
            status: response.status,
            code: detail.as_ref().and_then(|d| d.code.clone()),
            message: detail.and_then(|d| d.message),
        }
    }
}

/// PATCH body for the editable profile fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfilePatch {
    #[serde(rename = "mobilePhone")]
    pub mobile_phone: Option<String>,
    #[serde(rename = "businessPhones")]
    pub business_phones: Vec<String>,
}

impl ProfilePatch {
    /// Build from the `mobilePhone` and `businessPhone` form fields
    pub fn from_form(mobile_phone: Option<String>, business_phone: Option<String>) -> Self {
        Self {
            mobile_phone,
            business_phones: business_phone.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_patch_body() {
        let patch = ProfilePatch::from_form(Some("555".to_string()), Some("111".to_string()));
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"mobilePhone": "555", "businessPhones": ["111"]})
        );
    }

    #[test]
    fn test_profile_patch_missing_fields() {
        let patch = ProfilePatch::from_form(None, None);
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"mobilePhone": null, "businessPhones": []})
        );
    }

    #[test]
    fn test_graph_error_from_error_body() {
        let response = DirectoryResponse::new(
            StatusCode::FORBIDDEN,
            r#"{"error":{"code":"Authorization_RequestDenied","message":"Insufficient privileges to complete the operation."}}"#,
        );
        let error = GraphError::from_response(&response);
        assert_eq!(error.status, StatusCode::FORBIDDEN);
        assert_eq!(error.code.as_deref(), Some("Authorization_RequestDenied"));
        assert_eq!(
            error.message.as_deref(),
            Some("Insufficient privileges to complete the operation.")
        );
    }

    #[test]
    fn test_graph_error_from_non_json_body() {
        let response = DirectoryResponse::new(StatusCode::BAD_GATEWAY, "<html>upstream</html>");
        let error = GraphError::from_response(&response);
        assert_eq!(
            error,
            GraphError {
                status: StatusCode::BAD_GATEWAY,
                code: None,
                message: None,
            }
        );
    }

    #[test]
    fn test_outcome() {
        let ok = DirectoryResponse::new(StatusCode::OK, r#"{"displayName":"Jane"}"#);
        assert_eq!(ok.outcome(StatusCode::OK), Ok(json!({"displayName": "Jane"})));

        let no_content = DirectoryResponse::new(StatusCode::NO_CONTENT, "");
        assert_eq!(no_content.outcome(StatusCode::NO_CONTENT), Ok(Value::Null));

        let err = ok.outcome(StatusCode::NO_CONTENT).unwrap_err();
        assert_eq!(err.status, StatusCode::OK);
    }
}
