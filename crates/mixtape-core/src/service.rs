//! Collaborator traits for the remote backend.
//!
//! The traits are implemented by `mixtape-client` over HTTP and by in-memory
//! fakes in tests. Higher layers (`mixtape-match`, `mixtape-cli`) depend on
//! these abstractions, not on any concrete transport.
//!
//! All methods return `Send` futures so implementations can be driven from
//! spawned tokio tasks.

use std::future::Future;

use crate::{
  Result,
  message::{Message, NewMessage},
  profile::{Profile, ProfileId},
};

// ─── Profiles ────────────────────────────────────────────────────────────────

/// Read access to the profile registry.
pub trait ProfileRegistry: Send + Sync {
  /// Every registered profile, including the session user's own.
  fn list_profiles(&self) -> impl Future<Output = Result<Vec<Profile>>> + Send + '_;

  /// A single profile. Fails with [`crate::Error::NotFound`] if unknown.
  fn get_profile(
    &self,
    id: ProfileId,
  ) -> impl Future<Output = Result<Profile>> + Send + '_;
}

// ─── Friendships ─────────────────────────────────────────────────────────────

/// The authoritative registry of friendship edges.
pub trait FriendshipService: Send + Sync {
  /// Profiles `user` has befriended.
  fn list_friends(
    &self,
    user: ProfileId,
  ) -> impl Future<Output = Result<Vec<Profile>>> + Send + '_;

  /// Whether the edge `user → profile` exists.
  fn friend_status(
    &self,
    user: ProfileId,
    profile: ProfileId,
  ) -> impl Future<Output = Result<bool>> + Send + '_;

  /// Create the edge `user → profile`. Adding an existing edge succeeds.
  fn add_friend(
    &self,
    user: ProfileId,
    profile: ProfileId,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// Delete the edge `user → profile`. Fails with
  /// [`crate::Error::NotFound`] if it does not exist.
  fn remove_friend(
    &self,
    user: ProfileId,
    profile: ProfileId,
  ) -> impl Future<Output = Result<()>> + Send + '_;
}

// ─── Messages ────────────────────────────────────────────────────────────────

/// The shared chat board.
pub trait MessageService: Send + Sync {
  /// All messages, oldest first.
  fn list_messages(&self) -> impl Future<Output = Result<Vec<Message>>> + Send + '_;

  /// Post a message and return it as stored.
  fn post_message(
    &self,
    message: NewMessage,
  ) -> impl Future<Output = Result<Message>> + Send + '_;
}
