//! Friendship edge state.
//!
//! An edge is directed from the session user to one profile. The remote
//! friendship service owns the authoritative value; the client caches it and
//! passes through a pending state only while a mutation is in flight.

use serde::{Deserialize, Serialize};

/// The cached state of one friendship edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeState {
  #[default]
  None,
  Friend,
  /// `add_friend` is in flight; the pre-call state was `None`.
  PendingAdd,
  /// `remove_friend` is in flight; the pre-call state was `Friend`.
  PendingRemove,
}

impl EdgeState {
  pub fn is_pending(self) -> bool {
    matches!(self, Self::PendingAdd | Self::PendingRemove)
  }

  /// Whether the profile should be displayed as a friend.
  ///
  /// Pending edges report their pre-call value: nothing is shown as changed
  /// until the server confirms it.
  pub fn is_friend(self) -> bool {
    matches!(self, Self::Friend | Self::PendingRemove)
  }

  /// The state to restore when the in-flight mutation fails.
  pub fn settled(self) -> Self {
    match self {
      Self::PendingAdd => Self::None,
      Self::PendingRemove => Self::Friend,
      s => s,
    }
  }

  pub fn from_friend(is_friend: bool) -> Self {
    if is_friend { Self::Friend } else { Self::None }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pending_states_report_pre_call_value() {
    assert!(!EdgeState::PendingAdd.is_friend());
    assert!(EdgeState::PendingRemove.is_friend());
    assert_eq!(EdgeState::PendingAdd.settled(), EdgeState::None);
    assert_eq!(EdgeState::PendingRemove.settled(), EdgeState::Friend);
    assert_eq!(EdgeState::Friend.settled(), EdgeState::Friend);
  }
}
