mod client;
mod errors;
mod graph;
mod types;

pub use client::{DirectoryApi, ReqwestDirectory};
pub use errors::DirectoryError;
pub use graph::{get_me, list_users, update_user};
pub use types::{DirectoryRequest, DirectoryResponse, GraphError, GraphOutcome, ProfilePatch};
