//! Matching and friendship-state synchronisation for Mixtape views.
//!
//! [`MatchController`] owns a browsing session over the profile registry and
//! a cache of friendship edges, and reconciles like / dislike / unfriend
//! actions against the authoritative [`FriendshipService`]. [`MessageFeed`]
//! keeps a periodically refreshed snapshot of the chat board.
//!
//! [`FriendshipService`]: mixtape_core::service::FriendshipService

mod controller;
mod cursor;
mod feed;
mod state;

pub use controller::{Candidate, DEFAULT_TIMEOUT, MatchConfig, MatchController};
pub use cursor::Cursor;
pub use feed::{DEFAULT_INTERVAL, FeedSnapshot, MessageFeed};
