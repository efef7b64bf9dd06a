//! graph-profile - sign-in and directory profile coordination
//!
//! Signs users in against the Microsoft identity platform (or any OIDC
//! issuer) with the authorization-code flow, keeps their tokens in a
//! server-side session, and reads or updates their profile through the
//! Microsoft Graph REST API. Web frameworks call the `*_core` functions and
//! render the returned [`Page`].

mod config;
mod coordination;
mod directory;
mod oauth2;
mod session;
mod storage;
mod utils;

pub use config::{
    AppConfig, ConfigError, DEFAULT_GRAPH_ENDPOINT, DEFAULT_REDIRECT_PATH, DEFAULT_SCOPES,
    SessionConfig, SessionType,
};

pub use coordination::{
    AppContext, CoordinationError, Page, ProfileForm, authorized_core, index_core, login_core,
    logout_core, profile_get_core, profile_post_core, users_core,
};

pub use directory::{
    DirectoryApi, DirectoryError, DirectoryRequest, DirectoryResponse, GraphError, GraphOutcome,
    ProfilePatch, ReqwestDirectory, get_me, list_users, update_user,
};

pub use oauth2::{
    AccessToken, AuthFlow, Authenticator, ErrorCode, ErrorResult, IdClaims, LoginRedirect,
    OAuth2Error, OidcAuth, OidcDiscoveryDocument, OidcDiscoveryError, TokenCache,
};

pub use session::{
    Session, SessionData, SessionError, destroy_session, load_session, rotate_session,
    save_session, session_id_from_headers,
};

pub use storage::{
    CacheData, CacheKey, CacheStore, FileCacheStore, InMemoryCacheStore, RedisCacheStore,
    StorageError, build_cache_store,
};

pub use utils::UtilError;
