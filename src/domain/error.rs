use thiserror::Error;

/// Terminal failures surfaced directly to the caller. Nothing here is retried
/// internally. `InvalidCredential` carries one fixed message for both unknown
/// email and wrong password so login failures cannot be used to enumerate
/// accounts.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("User with this email already exists")]
    DuplicateIdentity,
    #[error("Invalid email or password")]
    InvalidCredential,
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("Insufficient permissions")]
    Forbidden,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
}
