pub mod app_config;
pub mod backend;
pub mod session;

pub use backend::{is_path_segment, BackendClient, ClientError};
pub use session::{AuthToken, SessionStore, StoredSession};
