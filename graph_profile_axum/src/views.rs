use askama::Template;
use axum::response::{Html, IntoResponse, Redirect, Response};
use http::StatusCode;
use serde_json::Value;

use graph_profile::{ErrorResult, IdClaims, Page};

use super::error::IntoResponseError;

#[derive(Template)]
#[template(path = "login.html")]
pub(super) struct LoginTemplate {
    pub(super) auth_uri: String,
}

#[derive(Template)]
#[template(path = "index.html")]
pub(super) struct IndexTemplate {
    pub(super) name: String,
    pub(super) username: String,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub(super) struct ProfileTemplate {
    /// `(field, value)` rows of the profile
    pub(super) fields: Vec<(String, String)>,
    pub(super) id: String,
    pub(super) mobile_phone: String,
    pub(super) business_phone: String,
    /// Status of the fetch, shown after a plain GET
    pub(super) status: String,
}

pub(super) struct UserRow {
    pub(super) display_name: String,
    pub(super) mail: String,
    pub(super) job_title: String,
}

#[derive(Template)]
#[template(path = "users.html")]
pub(super) struct UsersTemplate {
    pub(super) users: Vec<UserRow>,
}

#[derive(Template)]
#[template(path = "auth_error.html")]
pub(super) struct AuthErrorTemplate {
    pub(super) error: String,
    pub(super) error_description: String,
}

fn text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(text).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

fn field(value: &Value, key: &str) -> String {
    value.get(key).map(text).unwrap_or_default()
}

impl From<&IdClaims> for IndexTemplate {
    fn from(user: &IdClaims) -> Self {
        Self {
            name: user.name.clone().unwrap_or_else(|| user.sub.clone()),
            username: user.preferred_username.clone().unwrap_or_default(),
        }
    }
}

impl ProfileTemplate {
    pub(super) fn new(user: &Value, result: Option<u16>) -> Self {
        let fields = match user {
            Value::Object(map) => map
                .iter()
                .filter(|(key, _)| !key.starts_with('@'))
                .map(|(key, value)| (key.clone(), text(value)))
                .collect(),
            _ => Vec::new(),
        };
        let business_phone = user
            .get("businessPhones")
            .and_then(|phones| phones.get(0))
            .map(text)
            .unwrap_or_default();

        Self {
            fields,
            id: field(user, "id"),
            mobile_phone: field(user, "mobilePhone"),
            business_phone,
            status: result.map(|s| s.to_string()).unwrap_or_default(),
        }
    }
}

impl UsersTemplate {
    pub(super) fn new(result: &Value) -> Self {
        let users = result
            .get("value")
            .and_then(Value::as_array)
            .map(|users| {
                users
                    .iter()
                    .map(|user| UserRow {
                        display_name: field(user, "displayName"),
                        mail: field(user, "mail"),
                        job_title: field(user, "jobTitle"),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { users }
    }
}

impl From<&ErrorResult> for AuthErrorTemplate {
    fn from(result: &ErrorResult) -> Self {
        Self {
            error: result.error.to_string(),
            error_description: result.error_description.clone(),
        }
    }
}

fn html<T: Template>(template: T) -> Result<Response, (StatusCode, String)> {
    let body = template.render().into_response_error()?;
    Ok(Html(body).into_response())
}

/// Render a coordination result. Error pages are regular `200` pages.
pub(super) fn render_page(page: &Page) -> Result<Response, (StatusCode, String)> {
    match page {
        Page::Login { auth_uri } => html(LoginTemplate {
            auth_uri: auth_uri.clone(),
        }),
        Page::Home { user } => html(IndexTemplate::from(user)),
        Page::Profile { user, result } => html(ProfileTemplate::new(user, *result)),
        Page::Users { result } => html(UsersTemplate::new(result)),
        Page::AuthError { result } => html(AuthErrorTemplate::from(result)),
        Page::Redirect { location } => Ok(Redirect::to(location).into_response()),
    }
}
