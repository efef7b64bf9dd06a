use async_trait::async_trait;
use std::time::Duration;

use super::errors::DirectoryError;
use super::types::{DirectoryRequest, DirectoryResponse};

/// Transport for directory API calls
#[async_trait]
pub trait DirectoryApi: Send + Sync + 'static {
    async fn send(&self, request: DirectoryRequest) -> Result<DirectoryResponse, DirectoryError>;
}

pub struct ReqwestDirectory {
    client: reqwest::Client,
}

impl ReqwestDirectory {
    pub fn new() -> Result<Self, DirectoryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(32)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DirectoryApi for ReqwestDirectory {
    #[tracing::instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: DirectoryRequest) -> Result<DirectoryResponse, DirectoryError> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .bearer_auth(request.bearer.secret());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.inspect_err(|e| {
            tracing::error!("Directory request failed: {}", e);
        })?;
        let status = response.status();
        let body = response.text().await?;

        tracing::debug!("Directory responded with {}", status);
        Ok(DirectoryResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{ProfilePatch, get_me, update_user};
    use crate::oauth2::AccessToken;
    use axum::{
        Json, Router,
        extract::State,
        http::{HeaderMap, StatusCode},
        routing::{get, patch},
    };
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<(Option<String>, Option<String>, Value)>>>;

    fn header(headers: &HeaderMap, name: &str) -> Option<String> {
        headers
            .get(name)
            .map(|v| v.to_str().unwrap().to_string())
    }

    async fn me(State(seen): State<Seen>, headers: HeaderMap) -> Json<Value> {
        seen.lock()
            .unwrap()
            .push((header(&headers, "authorization"), None, Value::Null));
        Json(json!({"displayName": "Jane"}))
    }

    async fn patch_user(
        State(seen): State<Seen>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> StatusCode {
        seen.lock().unwrap().push((
            header(&headers, "authorization"),
            header(&headers, "content-type"),
            body,
        ));
        StatusCode::NO_CONTENT
    }

    async fn start_directory() -> (String, Seen) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/v1.0/me", get(me))
            .route("/v1.0/users/{id}", patch(patch_user))
            .with_state(seen.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/v1.0", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (base, seen)
    }

    #[tokio::test]
    async fn test_send_get_with_bearer() {
        let (base, seen) = start_directory().await;
        let directory = ReqwestDirectory::new().unwrap();

        let response = directory
            .send(get_me(&base, AccessToken::new("tok-1")))
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            serde_json::from_str::<Value>(&response.body).unwrap(),
            json!({"displayName": "Jane"})
        );
        assert_eq!(seen.lock().unwrap()[0].0.as_deref(), Some("Bearer tok-1"));
    }

    #[tokio::test]
    async fn test_send_patch_with_json_body() {
        let (base, seen) = start_directory().await;
        let directory = ReqwestDirectory::new().unwrap();
        let patch = ProfilePatch::from_form(Some("555".to_string()), Some("111".to_string()));

        let response = directory
            .send(update_user(&base, AccessToken::new("tok-2"), "u1", &patch).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::NO_CONTENT);
        assert!(response.body.is_empty());

        let (auth, content_type, body) = seen.lock().unwrap()[0].clone();
        assert_eq!(auth.as_deref(), Some("Bearer tok-2"));
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert_eq!(body, json!({"mobilePhone": "555", "businessPhones": ["111"]}));
    }

    #[tokio::test]
    async fn test_send_unreachable_is_transport_error() {
        let directory = ReqwestDirectory::new().unwrap();
        let result = directory
            .send(get_me("http://127.0.0.1:9/v1.0", AccessToken::new("t")))
            .await;
        assert!(matches!(result, Err(DirectoryError::Transport(_))));
    }
}
