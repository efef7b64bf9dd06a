mod auth;
mod auth_helpers;
mod context;
mod errors;
mod profile;
mod types;

#[cfg(test)]
pub(crate) mod test_utils;

pub use auth::{authorized_core, index_core, login_core, logout_core};
pub use context::AppContext;
pub use errors::CoordinationError;
pub use profile::{profile_get_core, profile_post_core, users_core};
pub use types::{Page, ProfileForm};
