use chrono::Utc;
use http::header::{COOKIE, HeaderMap};

use crate::config::SessionConfig;
use crate::storage::{CacheData, CacheKey, CacheStore, expiry_after};
use crate::utils::header_set_cookie;

use super::errors::SessionError;
use super::types::{SESSION_PREFIX, Session, StoredSession};

/// Value of the session cookie in the request headers, if present
pub fn session_id_from_headers<'a>(
    headers: &'a HeaderMap,
    cookie_name: &str,
) -> Result<Option<&'a str>, SessionError> {
    let Some(cookie_header) = headers.get(COOKIE) else {
        tracing::debug!("No cookie header found");
        return Ok(None);
    };

    let cookie_str = cookie_header.to_str().map_err(|e| {
        tracing::error!("Invalid cookie header: {}", e);
        SessionError::HeaderError("Invalid cookie header".to_string())
    })?;

    let session_id = cookie_str.split(';').map(|s| s.trim()).find_map(|s| {
        let mut parts = s.splitn(2, '=');
        match (parts.next(), parts.next()) {
            (Some(k), Some(v)) if k == cookie_name => Some(v),
            _ => None,
        }
    });

    if session_id.is_none() {
        tracing::debug!("No session cookie '{}' found in cookies", cookie_name);
    }

    Ok(session_id)
}

/// Load the session named by the cookie, or start a fresh one.
///
/// Unknown, malformed, corrupt and expired sessions all yield a new empty
/// session with a new id. Only store failures are errors.
pub async fn load_session(
    store: &dyn CacheStore,
    cookie_value: Option<&str>,
) -> Result<Session, SessionError> {
    let Some(cookie_value) = cookie_value else {
        return Session::fresh();
    };

    let Ok(key) = CacheKey::new(cookie_value.to_string()) else {
        tracing::debug!("Ignoring malformed session cookie");
        return Session::fresh();
    };

    let Some(cached) = store.get(SESSION_PREFIX, &key).await? else {
        tracing::debug!("Session not found in store");
        return Session::fresh();
    };

    let stored: StoredSession = match cached.try_into() {
        Ok(stored) => stored,
        Err(e) => {
            tracing::warn!("Discarding unreadable session: {}", e);
            store.remove(SESSION_PREFIX, &key).await?;
            return Session::fresh();
        }
    };

    if stored.expires_at <= Utc::now() {
        tracing::debug!("Session expired at {}", stored.expires_at);
        store.remove(SESSION_PREFIX, &key).await?;
        return Session::fresh();
    }

    Ok(Session::existing(key, stored.data))
}

/// Persist the session and return the `Set-Cookie` headers for the response.
///
/// Nothing is written when the data is unchanged since it was loaded. A
/// session that was loaded from the store but has since been removed (by a
/// logout that finished first) is not recreated.
pub async fn save_session(
    store: &dyn CacheStore,
    session: &Session,
    config: &SessionConfig,
) -> Result<HeaderMap, SessionError> {
    let mut headers = HeaderMap::new();
    if !session.is_modified() {
        return Ok(headers);
    }

    if !session.is_new() && store.get(SESSION_PREFIX, session.key()).await?.is_none() {
        tracing::debug!("Session was removed during the request; not saving it");
        return Ok(headers);
    }

    let stored = StoredSession {
        data: session.data.clone(),
        expires_at: expiry_after(config.max_age)?,
    };
    let cache: CacheData = stored.try_into()?;
    store
        .put_with_ttl(SESSION_PREFIX, session.key(), cache, config.max_age)
        .await?;

    header_set_cookie(
        &mut headers,
        &config.cookie_name,
        session.id(),
        config.max_age,
        config.cookie_secure,
    )?;
    Ok(headers)
}

/// Issue a new id for the session and drop the entry stored under the old one
pub async fn rotate_session(
    store: &dyn CacheStore,
    session: &mut Session,
) -> Result<(), SessionError> {
    if let Some(old) = session.rotate()? {
        store.remove(SESSION_PREFIX, &old).await?;
    }
    tracing::debug!("Session id rotated");
    Ok(())
}

/// Delete the session and return headers that expire the cookie
pub async fn destroy_session(
    store: &dyn CacheStore,
    session: &Session,
    config: &SessionConfig,
) -> Result<HeaderMap, SessionError> {
    store.remove(SESSION_PREFIX, session.key()).await?;

    let mut headers = HeaderMap::new();
    header_set_cookie(
        &mut headers,
        &config.cookie_name,
        "",
        0,
        config.cookie_secure,
    )?;
    tracing::debug!("Session destroyed");
    Ok(headers)
}
