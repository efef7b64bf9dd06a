//! Stub collaborators for coordination tests

use async_trait::async_trait;
use chrono::{Duration, Utc};
use http::StatusCode;
use serde_json::Map;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::config::AppConfig;
use crate::directory::{DirectoryApi, DirectoryError, DirectoryRequest, DirectoryResponse};
use crate::oauth2::{
    AccessToken, AuthFlow, Authenticator, ErrorCode, ErrorResult, IdClaims, LoginRedirect,
    OAuth2Error, TokenCache,
};
use crate::session::SessionData;
use crate::storage::InMemoryCacheStore;

use super::context::AppContext;

pub(crate) fn claims() -> IdClaims {
    IdClaims {
        sub: "sub-jane".to_string(),
        name: Some("Jane Doe".to_string()),
        preferred_username: Some("jane@contoso.com".to_string()),
        oid: Some("oid-jane".to_string()),
        tid: None,
        nonce: None,
        extra: Map::new(),
    }
}

#[derive(Debug, Clone)]
pub(crate) struct LogInCall {
    pub scopes: Vec<String>,
    pub redirect_uri: String,
    pub prompt: Option<String>,
}

pub(crate) struct StubAuth {
    log_in_calls: Mutex<Vec<LogInCall>>,
    log_out_calls: Mutex<Vec<String>>,
    token_requests: Mutex<Vec<Vec<String>>>,
    token: Mutex<Result<AccessToken, OAuth2Error>>,
}

impl StubAuth {
    pub fn new() -> Self {
        Self {
            log_in_calls: Mutex::new(Vec::new()),
            log_out_calls: Mutex::new(Vec::new()),
            token_requests: Mutex::new(Vec::new()),
            token: Mutex::new(Ok(AccessToken::new("stub-token"))),
        }
    }

    pub fn auth_uri_for(redirect_uri: &str) -> String {
        format!(
            "https://login.example.com/authorize?redirect_uri={}",
            urlencoding::encode(redirect_uri)
        )
    }

    pub fn logout_url_for(post_logout_redirect: &str) -> String {
        format!(
            "https://login.example.com/logout?post_logout_redirect_uri={}",
            urlencoding::encode(post_logout_redirect)
        )
    }

    pub fn set_token_result(&self, result: Result<AccessToken, OAuth2Error>) {
        *self.token.lock().unwrap() = result;
    }

    pub fn log_in_calls(&self) -> Vec<LogInCall> {
        self.log_in_calls.lock().unwrap().clone()
    }

    pub fn log_out_calls(&self) -> Vec<String> {
        self.log_out_calls.lock().unwrap().clone()
    }

    pub fn token_requests(&self) -> Vec<Vec<String>> {
        self.token_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Authenticator for StubAuth {
    async fn log_in(
        &self,
        session: &mut SessionData,
        scopes: &[String],
        redirect_uri: &str,
        prompt: Option<&str>,
    ) -> Result<LoginRedirect, OAuth2Error> {
        self.log_in_calls.lock().unwrap().push(LogInCall {
            scopes: scopes.to_vec(),
            redirect_uri: redirect_uri.to_string(),
            prompt: prompt.map(str::to_string),
        });
        session.auth_flow = Some(AuthFlow {
            state: "stub-state".to_string(),
            nonce: "stub-nonce".to_string(),
            code_verifier: "stub-verifier".to_string(),
            redirect_uri: redirect_uri.to_string(),
            scopes: scopes.to_vec(),
            created_at: Utc::now(),
        });
        Ok(LoginRedirect {
            auth_uri: Self::auth_uri_for(redirect_uri),
        })
    }

    async fn complete_log_in(
        &self,
        session: &mut SessionData,
        params: &HashMap<String, String>,
    ) -> Result<IdClaims, OAuth2Error> {
        let flow = session.auth_flow.take();
        if let Some(error) = params.get("error") {
            return Err(OAuth2Error::Provider(ErrorResult::new(
                ErrorCode::Code(error.clone()),
                params.get("error_description").cloned().unwrap_or_default(),
            )));
        }
        let flow = flow.ok_or(OAuth2Error::NoFlowInProgress)?;
        if params.get("state") != Some(&flow.state) {
            return Err(OAuth2Error::StateMismatch);
        }

        session.user = Some(claims());
        session.tokens = Some(TokenCache {
            access_token: "stub-token".to_string(),
            refresh_token: Some("stub-refresh".to_string()),
            expires_at: Utc::now() + Duration::hours(1),
            scopes: flow.scopes,
        });
        Ok(claims())
    }

    async fn log_out(
        &self,
        session: &mut SessionData,
        post_logout_redirect: &str,
    ) -> Result<String, OAuth2Error> {
        self.log_out_calls
            .lock()
            .unwrap()
            .push(post_logout_redirect.to_string());
        *session = SessionData::default();
        Ok(Self::logout_url_for(post_logout_redirect))
    }

    fn get_user(&self, session: &SessionData) -> Option<IdClaims> {
        session.user.clone()
    }

    async fn get_token_for_user(
        &self,
        _session: &mut SessionData,
        scopes: &[String],
    ) -> Result<AccessToken, OAuth2Error> {
        self.token_requests.lock().unwrap().push(scopes.to_vec());
        self.token.lock().unwrap().clone()
    }
}

/// Directory transport answering from a queue of canned responses
pub(crate) struct StubDirectory {
    responses: Mutex<VecDeque<DirectoryResponse>>,
    requests: Mutex<Vec<DirectoryRequest>>,
}

impl StubDirectory {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, status: StatusCode, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(DirectoryResponse::new(status, body));
    }

    pub fn requests(&self) -> Vec<DirectoryRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DirectoryApi for StubDirectory {
    async fn send(&self, request: DirectoryRequest) -> Result<DirectoryResponse, DirectoryError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| DirectoryError::Transport("connection refused".to_string()))
    }
}

pub(crate) fn test_context_with<F>(overrides: F) -> (AppContext, Arc<StubAuth>, Arc<StubDirectory>)
where
    F: Fn(&str) -> Option<String>,
{
    let config = AppConfig::from_lookup(|key| {
        overrides(key).or_else(|| match key {
            "AUTHORITY" => Some("https://login.microsoftonline.com/common".to_string()),
            "CLIENT_ID" => Some("client-123".to_string()),
            "CLIENT_SECRET" => Some("s3cret".to_string()),
            "GRAPH_ENDPOINT" => Some("https://graph.test/v1.0".to_string()),
            "SESSION_TYPE" => Some("memory".to_string()),
            _ => None,
        })
    })
    .unwrap();

    let auth = Arc::new(StubAuth::new());
    let directory = Arc::new(StubDirectory::new());
    let ctx = AppContext::new(
        Arc::new(config),
        auth.clone(),
        directory.clone(),
        Arc::new(InMemoryCacheStore::new()),
    );
    (ctx, auth, directory)
}

pub(crate) fn test_context() -> (AppContext, Arc<StubAuth>, Arc<StubDirectory>) {
    test_context_with(|_| None)
}
