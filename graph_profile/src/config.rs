//! Application configuration, read once from the process environment

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Callback route the identity provider redirects back to
pub const DEFAULT_REDIRECT_PATH: &str = "/getAToken";

/// Permission scopes the user consents to during log-in
pub const DEFAULT_SCOPES: [&str; 3] = ["User.Read", "User.ReadBasic.All", "User.ReadWrite"];

pub const DEFAULT_GRAPH_ENDPOINT: &str = "https://graph.microsoft.com/v1.0";

const DEFAULT_SESSION_FILE_DIR: &str = "flask_session";
const DEFAULT_SESSION_COOKIE_NAME: &str = "session";
const DEFAULT_SESSION_COOKIE_MAX_AGE: u64 = 86400;
/// 400 days, the longest cookie lifetime browsers honour
const MAX_SESSION_COOKIE_MAX_AGE: u64 = 400 * 86400;

/// Fixed application routes the callback route must not shadow
const APP_ROUTES: [&str; 5] = ["/login", "/logout", "/profile", "/users", "/health"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("REDIRECT_PATH must not be /")]
    RootRedirectPath,
}

/// Where session state is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionType {
    Filesystem,
    Memory,
    Redis,
}

impl FromStr for SessionType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "filesystem" => Ok(Self::Filesystem),
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            _ => Err(ConfigError::Invalid {
                key: "SESSION_TYPE",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub store_type: SessionType,
    /// Directory holding one file per session (filesystem store)
    pub file_dir: PathBuf,
    pub redis_url: Option<String>,
    pub cookie_name: String,
    /// Session lifetime in seconds, used for both the cookie and the store TTL
    pub max_age: u64,
    pub cookie_secure: bool,
}

/// Configuration object constructed once at process start and shared by
/// reference with the orchestrator and the route handlers.
#[derive(Clone)]
pub struct AppConfig {
    /// Identity provider issuer URL, e.g. `https://login.microsoftonline.com/common`
    pub authority: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_path: String,
    pub scopes: Vec<String>,
    pub session: SessionConfig,
    /// Externally visible origin (`https://app.example.com`); derived from the
    /// request `Host` header when unset.
    pub origin: Option<String>,
    pub graph_endpoint: String,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("authority", &self.authority)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_path", &self.redirect_path)
            .field("scopes", &self.scopes)
            .field("session", &self.session)
            .field("origin", &self.origin)
            .field("graph_endpoint", &self.graph_endpoint)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let authority = required("AUTHORITY")?.trim_end_matches('/').to_string();
        let client_id = required("CLIENT_ID")?;
        let client_secret = required("CLIENT_SECRET")?;

        let redirect_path =
            lookup("REDIRECT_PATH").unwrap_or_else(|| DEFAULT_REDIRECT_PATH.to_string());
        if redirect_path == "/" {
            return Err(ConfigError::RootRedirectPath);
        }
        if !redirect_path.starts_with('/')
            || APP_ROUTES.contains(&redirect_path.as_str())
            || redirect_path.contains(['{', '}', '*', ':', '?', '#'])
        {
            return Err(ConfigError::Invalid {
                key: "REDIRECT_PATH",
                value: redirect_path,
            });
        }

        let scopes = match lookup("SCOPE") {
            Some(s) => parse_scopes(&s),
            None => DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
        };

        let store_type = match lookup("SESSION_TYPE") {
            Some(s) => s.parse()?,
            None => SessionType::Filesystem,
        };
        let redis_url = lookup("SESSION_REDIS_URL");
        if store_type == SessionType::Redis && redis_url.is_none() {
            return Err(ConfigError::Missing("SESSION_REDIS_URL"));
        }

        let max_age = match lookup("SESSION_COOKIE_MAX_AGE") {
            Some(s) => match s.parse::<u64>() {
                Ok(secs) if (1..=MAX_SESSION_COOKIE_MAX_AGE).contains(&secs) => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "SESSION_COOKIE_MAX_AGE",
                        value: s,
                    });
                }
            },
            None => DEFAULT_SESSION_COOKIE_MAX_AGE,
        };

        let cookie_secure = match lookup("SESSION_COOKIE_SECURE") {
            Some(s) => parse_bool("SESSION_COOKIE_SECURE", &s)?,
            None => false,
        };

        let session = SessionConfig {
            store_type,
            file_dir: lookup("SESSION_FILE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE_DIR)),
            redis_url,
            cookie_name: lookup("SESSION_COOKIE_NAME")
                .unwrap_or_else(|| DEFAULT_SESSION_COOKIE_NAME.to_string()),
            max_age,
            cookie_secure,
        };

        let origin = lookup("ORIGIN").map(|o| o.trim_end_matches('/').to_string());
        let graph_endpoint = lookup("GRAPH_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_GRAPH_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            authority,
            client_id,
            client_secret,
            redirect_path,
            scopes,
            session,
            origin,
            graph_endpoint,
        })
    }

    /// Absolute URL for a route of this application.
    ///
    /// Uses the configured `ORIGIN` when present, otherwise `http://{host}`
    /// from the incoming request.
    pub fn external_url(&self, host: Option<&str>, path: &str) -> String {
        let origin = match (&self.origin, host) {
            (Some(origin), _) => origin.clone(),
            (None, Some(host)) => format!("http://{host}"),
            (None, None) => "http://localhost".to_string(),
        };
        format!("{origin}{path}")
    }
}

fn parse_scopes(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
    }
}
