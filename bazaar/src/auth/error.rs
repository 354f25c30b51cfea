use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Insufficient role")]
    InsufficientRole,

    #[error("User not found")]
    UserNotFound,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Password does not meet strength requirements")]
    WeakPassword,

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Password hashing error: {0}")]
    PasswordHashError(String),
}

impl From<shared::Error> for AuthError {
    fn from(err: shared::Error) -> Self {
        AuthError::StorageError(err.to_string())
    }
}
