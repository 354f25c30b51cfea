pub mod authentication;
pub mod authorization;

pub use authentication::{authenticate, CurrentUser};
pub use authorization::{require_admin, require_session, require_staff};
