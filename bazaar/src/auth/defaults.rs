use super::error::AuthError;
use super::models::{Role, User};
use super::password::hash_password;

/// Build the default admin user seeded at startup when no account with the
/// configured username exists yet.
pub fn create_default_admin(username: String, password: String) -> Result<User, AuthError> {
    let password_hash = hash_password(&password)?;
    Ok(User::new(username, password_hash, Role::Admin))
}
