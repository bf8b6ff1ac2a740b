//! Error types for `mixtape-core`.
//!
//! Every collaborator failure is mapped into one of these variants before it
//! reaches a view. The type is `Clone` so the controller can retain the last
//! error for display while also returning it to the caller.

use std::time::Duration;

use thiserror::Error;

use crate::profile::ProfileId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// Transport failure, undecodable body, or an unclassified non-2xx status.
  #[error("fetch failed: {0}")]
  Fetch(String),

  /// Missing or rejected session (HTTP 401 / 403).
  #[error("not authorised: {0}")]
  Auth(String),

  /// Profile or friendship edge missing server-side (HTTP 404).
  #[error("not found: {0}")]
  NotFound(String),

  #[error("server error {status}: {message}")]
  Server { status: u16, message: String },

  /// A mutation of this profile's edge is already in flight.
  #[error("an operation on profile {0} is already in progress")]
  OperationInProgress(ProfileId),

  #[error("operation timed out after {0:?}")]
  Timeout(Duration),
}

impl Error {
  /// Map an HTTP status code and server-supplied message to the taxonomy.
  ///
  /// Callers only pass non-2xx statuses; anything not covered by a more
  /// specific variant becomes [`Error::Fetch`].
  pub fn from_status(status: u16, message: impl Into<String>) -> Self {
    let message = message.into();
    match status {
      401 | 403 => Self::Auth(message),
      404 => Self::NotFound(message),
      500..=599 => Self::Server { status, message },
      _ => Self::Fetch(format!("HTTP {status}: {message}")),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
