//! # Session Error Type
//!
//! Unified error type for session operations - what the surrounding UI
//! layer sees.
//!
//! ## Error Handling Strategy
//! Every failure carries a short human-readable message via
//! [`SessionError::user_message`]. Business rule violations keep their
//! detail (the cashier needs to know *how much* stock is available);
//! internal store failures are logged in full and surfaced generically.

use thiserror::Error;

use shopbook_core::{CoreError, ValidationError};
use shopbook_store::StoreError;

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No identity is signed in; a session cannot open.
    #[error("No identity signed in")]
    SignedOut,

    /// A business rule rejected the operation (insufficient stock,
    /// overpayment, unknown entity, bad input).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The document store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    /// Short human-readable message for toast/alert display.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::SignedOut => "Please sign in to continue.".to_string(),

            // Business rules explain themselves
            SessionError::Core(e) => e.to_string(),

            // Well-formed misses read naturally too
            SessionError::Store(StoreError::NotFound { collection, id }) => {
                format!("Record no longer exists ({collection}/{id}).")
            }

            SessionError::Store(StoreError::Corrupt { collection, .. }) => {
                format!("A stored {collection} record could not be read.")
            }

            // Everything else from the store is an availability problem;
            // the detail goes to the log, not the operator
            SessionError::Store(e) => {
                tracing::error!("store failure: {e}");
                "Could not reach the data store. Check your connection and retry.".to_string()
            }
        }
    }
}

/// Validation failures fold into the core error taxonomy.
impl From<ValidationError> for SessionError {
    fn from(err: ValidationError) -> Self {
        SessionError::Core(CoreError::Validation(err))
    }
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
