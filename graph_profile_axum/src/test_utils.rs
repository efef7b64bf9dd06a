//! Stub collaborators and request helpers for router tests

use async_trait::async_trait;
use axum::{Router, body::Body};
use chrono::{Duration, Utc};
use http::{Request, Response, StatusCode, header};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use graph_profile::{
    AccessToken, AppConfig, AppContext, AuthFlow, Authenticator, DirectoryApi, DirectoryError,
    DirectoryRequest, DirectoryResponse, ErrorCode, ErrorResult, IdClaims, InMemoryCacheStore,
    LoginRedirect, OAuth2Error, SessionData, TokenCache,
};

use crate::app_router_no_trace;

const AUTH_URI: &str = "https://login.example.com/authorize?client_id=client-123";
pub(crate) const LOGOUT_URL: &str = "https://login.example.com/logout";

pub(crate) fn claims() -> IdClaims {
    IdClaims {
        sub: "sub-jane".to_string(),
        name: Some("Jane Doe".to_string()),
        preferred_username: Some("jane@contoso.com".to_string()),
        oid: Some("oid-jane".to_string()),
        tid: None,
        nonce: None,
        extra: serde_json::Map::new(),
    }
}

#[derive(Default)]
pub(crate) struct StubAuth {
    pub(crate) redirect_uris: Mutex<Vec<String>>,
    pub(crate) post_logout_redirects: Mutex<Vec<String>>,
}

#[async_trait]
impl Authenticator for StubAuth {
    async fn log_in(
        &self,
        session: &mut SessionData,
        scopes: &[String],
        redirect_uri: &str,
        _prompt: Option<&str>,
    ) -> Result<LoginRedirect, OAuth2Error> {
        self.redirect_uris
            .lock()
            .unwrap()
            .push(redirect_uri.to_string());
        session.auth_flow = Some(AuthFlow {
            state: "stub-state".to_string(),
            nonce: "stub-nonce".to_string(),
            code_verifier: "stub-verifier".to_string(),
            redirect_uri: redirect_uri.to_string(),
            scopes: scopes.to_vec(),
            created_at: Utc::now(),
        });
        Ok(LoginRedirect {
            auth_uri: AUTH_URI.to_string(),
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
            refresh_token: None,
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
        self.post_logout_redirects
            .lock()
            .unwrap()
            .push(post_logout_redirect.to_string());
        *session = SessionData::default();
        Ok(format!(
            "{LOGOUT_URL}?post_logout_redirect_uri={}",
            urlencoding::encode(post_logout_redirect)
        ))
    }

    fn get_user(&self, session: &SessionData) -> Option<IdClaims> {
        session.user.clone()
    }

    async fn get_token_for_user(
        &self,
        session: &mut SessionData,
        _scopes: &[String],
    ) -> Result<AccessToken, OAuth2Error> {
        session
            .tokens
            .as_ref()
            .map(|t| AccessToken::new(t.access_token.clone()))
            .ok_or(OAuth2Error::NoTokenCached)
    }
}

#[derive(Default)]
pub(crate) struct StubDirectory {
    responses: Mutex<VecDeque<DirectoryResponse>>,
    pub(crate) requests: Mutex<Vec<DirectoryRequest>>,
}

impl StubDirectory {
    pub(crate) fn push(&self, status: StatusCode, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(DirectoryResponse::new(status, body));
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

pub(crate) struct TestApp {
    pub(crate) router: Router,
    pub(crate) auth: Arc<StubAuth>,
    pub(crate) directory: Arc<StubDirectory>,
}

pub(crate) fn test_app() -> TestApp {
    let config = AppConfig::from_lookup(|key| match key {
        "AUTHORITY" => Some("https://login.microsoftonline.com/common".to_string()),
        "CLIENT_ID" => Some("client-123".to_string()),
        "CLIENT_SECRET" => Some("s3cret".to_string()),
        "SESSION_TYPE" => Some("memory".to_string()),
        _ => None,
    })
    .unwrap();

    let auth = Arc::new(StubAuth::default());
    let directory = Arc::new(StubDirectory::default());
    let ctx = AppContext::new(
        Arc::new(config),
        auth.clone(),
        directory.clone(),
        Arc::new(InMemoryCacheStore::new()),
    );
    TestApp {
        router: app_router_no_trace(ctx),
        auth,
        directory,
    }
}

pub(crate) async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    form: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::HOST, "app.test");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let body = match form {
        Some(form) => {
            builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
            Body::from(form.to_string())
        }
        None => Body::empty(),
    };
    router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

/// `name=value` of the first `Set-Cookie` header
pub(crate) fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub(crate) async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Route through `/login` and the callback; returns the signed-in session cookie
pub(crate) async fn sign_in(app: &TestApp) -> String {
    sign_in_with_login_cookie(app).await.1
}

/// As [`sign_in`], also returning the cookie `/login` issued
pub(crate) async fn sign_in_with_login_cookie(app: &TestApp) -> (String, String) {
    let response = send(&app.router, "GET", "/login", None, None).await;
    let login_cookie = session_cookie(&response).unwrap();
    let response = send(
        &app.router,
        "GET",
        "/getAToken?code=good-code&state=stub-state",
        Some(&login_cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = session_cookie(&response).unwrap();
    (login_cookie, cookie)
}
