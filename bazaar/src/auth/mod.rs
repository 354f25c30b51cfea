pub mod auth_service;
pub mod defaults;
pub mod error;
pub mod models;
pub mod password;
pub mod session;

pub use auth_service::AuthService;
pub use defaults::create_default_admin;
pub use error::AuthError;
pub use models::{Role, User};
pub use session::SessionStore;
