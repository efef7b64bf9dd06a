mod core;
mod errors;
mod types;

pub use self::core::{
    destroy_session, load_session, rotate_session, save_session, session_id_from_headers,
};
pub use errors::SessionError;
pub use types::{Session, SessionData};
