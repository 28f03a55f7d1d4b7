//! Authentication: token validation, the session manager and the periodic
//! expiry check.

pub mod session;
pub mod token;
pub mod watch;

pub use session::SessionManager;
pub use token::{is_token_valid, is_token_valid_at, token_expiry};
pub use watch::ExpiryWatch;

use thiserror::Error;

use crate::models::UserType;
use crate::storage::StorageError;

/// Message shown for any failed credential exchange.
pub const AUTH_FAILED_MESSAGE: &str =
    "Authentication failed. Please check your credentials and try again.";

/// Authentication errors.
///
/// `Display` is the user-facing message; [`AuthError::Failed`] carries the
/// underlying cause for logs only.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication failed. Please check your credentials and try again.")]
    Failed(String),

    #[error("{} authentication is coming soon.", .0.label())]
    NotSupported(UserType),

    #[error("Email and password are required.")]
    MissingCredentials,

    #[error("Could not save the session: {0}")]
    Storage(#[from] StorageError),
}
