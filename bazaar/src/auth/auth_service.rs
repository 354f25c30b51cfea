use std::sync::Arc;

use super::error::AuthError;
use super::models::{Role, User};
use super::password::verify_password;
use crate::ports::UserRepository;

pub struct AuthService {
    users: Arc<dyn UserRepository>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Authenticate a user by username and password.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let is_valid = verify_password(password, &user.password_hash)?;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Seller/admin gate for back-office surfaces.
    pub fn authorize_staff(&self, user: &User) -> Result<(), AuthError> {
        if user.role.is_staff() {
            Ok(())
        } else {
            Err(AuthError::InsufficientRole)
        }
    }

    pub fn authorize_admin(&self, user: &User) -> Result<(), AuthError> {
        if user.role.is_admin() {
            Ok(())
        } else {
            Err(AuthError::InsufficientRole)
        }
    }
}
