//! Error types for the desk client.
//!
//! This module defines the crate-wide error type [`DeskError`], the
//! re-authentication signal [`LoginRequired`], and a [`Result`] alias. All
//! errors are implemented with `thiserror`.

use crate::bridge::Failure;
use thiserror::Error;

/// Re-authentication signal raised by fetch operations.
///
/// Returned when the backend reports that the session token expired or is no
/// longer authorized. The caller is expected to discard the current session and
/// return the user to the login flow. It is the only failure that crosses the
/// resource container boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("login required: the backend session expired or is unauthorized")]
pub struct LoginRequired;

/// The main error type for desk client operations.
///
/// Consolidates the failures of the application facade, the process transport,
/// configuration loading and config storage.
///
/// # Examples
///
/// ```
/// use zentao_desk::domain::DeskError;
///
/// fn read_settings() -> Result<(), DeskError> {
///     Err(DeskError::Config("unknown field `backend`".to_string()))
/// }
/// ```
#[derive(Debug, Error)]
pub enum DeskError {
    /// The session is no longer valid; the user must log in again.
    #[error(transparent)]
    LoginRequired(#[from] LoginRequired),

    /// The backend rejected a command with a failure that is not a session
    /// failure. The content is backend defined.
    #[error("backend failure: {0}")]
    Backend(Failure),

    /// The backend process could not be started or reached.
    #[error("transport error: {0}")]
    Transport(String),

    /// Reading or writing persisted configuration failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings are invalid or unreadable.
    #[error("configuration error: {0}")]
    Config(String),
}

/// A specialized `Result` type for desk client operations.
pub type Result<T> = std::result::Result<T, DeskError>;
