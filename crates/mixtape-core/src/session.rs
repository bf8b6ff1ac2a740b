//! The authenticated session, injected into every component that talks to
//! the backend on behalf of the current user.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::profile::ProfileId;

/// Current user id and opaque bearer token.
///
/// The token is never printed by `Debug`.
pub struct Session {
  user_id: ProfileId,
  token:   SecretString,
}

impl Session {
  pub fn new(user_id: impl Into<ProfileId>, token: impl Into<String>) -> Self {
    Self { user_id: user_id.into(), token: SecretString::new(token.into()) }
  }

  pub fn user_id(&self) -> ProfileId { self.user_id }

  /// The raw token, for building an `Authorization` header.
  pub fn token(&self) -> &str { self.token.expose_secret() }
}

impl Clone for Session {
  fn clone(&self) -> Self {
    Self::new(self.user_id, self.token.expose_secret().clone())
  }
}

impl fmt::Debug for Session {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Session")
      .field("user_id", &self.user_id)
      .field("token", &"[redacted]")
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn debug_output_hides_token() {
    let s = Session::new(3, "s3cr3t");
    let printed = format!("{s:?}");
    assert!(!printed.contains("s3cr3t"), "{printed}");
    assert_eq!(s.clone().token(), "s3cr3t");
  }
}
