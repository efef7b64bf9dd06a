use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::oauth2::{AuthFlow, IdClaims, TokenCache};
use crate::storage::{CacheData, CacheKey};
use crate::utils::gen_random_string;

use super::errors::SessionError;

pub(super) const SESSION_PREFIX: &str = "session";

/// Server-side state of one browser session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    /// Pending sign-in, between `/login` and the callback
    #[serde(default)]
    pub auth_flow: Option<AuthFlow>,
    #[serde(default)]
    pub user: Option<IdClaims>,
    #[serde(default)]
    pub tokens: Option<TokenCache>,
}

impl SessionData {
    pub fn is_empty(&self) -> bool {
        self.auth_flow.is_none() && self.user.is_none() && self.tokens.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct StoredSession {
    pub(super) data: SessionData,
    pub(super) expires_at: DateTime<Utc>,
}

impl TryFrom<StoredSession> for CacheData {
    type Error = SessionError;

    fn try_from(stored: StoredSession) -> Result<Self, Self::Error> {
        let value =
            serde_json::to_string(&stored).map_err(|e| SessionError::Serde(e.to_string()))?;
        Ok(Self { value })
    }
}

impl TryFrom<CacheData> for StoredSession {
    type Error = SessionError;

    fn try_from(data: CacheData) -> Result<Self, Self::Error> {
        serde_json::from_str(&data.value).map_err(|e| SessionError::Serde(e.to_string()))
    }
}

/// Session context of a single request.
///
/// Loaded from the store when the request arrives and saved (or destroyed)
/// once the response is ready. `loaded` keeps the data as it was read so that
/// unchanged sessions are not written back.
#[derive(Debug, Clone)]
pub struct Session {
    id: CacheKey,
    pub data: SessionData,
    loaded: SessionData,
    is_new: bool,
}

impl Session {
    pub(super) fn fresh() -> Result<Self, SessionError> {
        let id = CacheKey::new(gen_random_string(32)?)?;
        Ok(Self {
            id,
            data: SessionData::default(),
            loaded: SessionData::default(),
            is_new: true,
        })
    }

    pub(super) fn existing(id: CacheKey, data: SessionData) -> Self {
        Self {
            id,
            loaded: data.clone(),
            data,
            is_new: false,
        }
    }

    /// Move the data to a newly generated id; returns the previous id if it
    /// was already stored
    pub(super) fn rotate(&mut self) -> Result<Option<CacheKey>, SessionError> {
        let new_id = CacheKey::new(gen_random_string(32)?)?;
        let old_id = std::mem::replace(&mut self.id, new_id);
        let was_stored = !self.is_new;
        self.is_new = true;
        self.loaded = SessionData::default();
        Ok(was_stored.then_some(old_id))
    }

    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    pub(super) fn key(&self) -> &CacheKey {
        &self.id
    }

    /// True when the browser did not present a usable session cookie
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// True when the data differs from what was loaded
    pub fn is_modified(&self) -> bool {
        self.data != self.loaded
    }
}
