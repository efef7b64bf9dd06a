use std::sync::Arc;

use crate::config::AppConfig;
use crate::directory::{DirectoryApi, ReqwestDirectory};
use crate::oauth2::{Authenticator, OidcAuth};
use crate::storage::{CacheStore, build_cache_store};

use super::errors::CoordinationError;

/// Collaborators shared by every request
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub auth: Arc<dyn Authenticator>,
    pub directory: Arc<dyn DirectoryApi>,
    pub sessions: Arc<dyn CacheStore>,
}

impl AppContext {
    pub fn new(
        config: Arc<AppConfig>,
        auth: Arc<dyn Authenticator>,
        directory: Arc<dyn DirectoryApi>,
        sessions: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            config,
            auth,
            directory,
            sessions,
        }
    }

    /// Build the production collaborators for `config`
    pub async fn init(config: AppConfig) -> Result<Self, CoordinationError> {
        let sessions = build_cache_store(&config.session).await?;
        let auth = OidcAuth::new(&config)?;
        let directory = ReqwestDirectory::new()?;

        tracing::info!(
            "Application context ready: authority={}, redirect_path={}",
            config.authority,
            config.redirect_path
        );
        Ok(Self::new(
            Arc::new(config),
            Arc::new(auth),
            Arc::new(directory),
            sessions,
        ))
    }
}
