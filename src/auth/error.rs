use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    #[error("You are not logged in! Please log in to get access.")]
    MissingToken,
    #[error("Invalid token. Please log in again.")]
    InvalidToken,
    #[error("Token expired. Please log in again.")]
    Expired,
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error("Token signing failed: {0}")]
    Signing(String),
}
