use thiserror::Error;

/// Session and permission failures raised before any handler logic runs.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ServiceError {
    #[error("You are not logged in")]
    NotLoggedIn,

    #[error("Login has expired")]
    SessionExpired,

    #[error("Your account has been blocked. Please contact the administrator.")]
    Blocked,

    #[error("Access denied")]
    Forbidden,

    #[error("Invalid role: {0}")]
    InvalidRole(String),
}
