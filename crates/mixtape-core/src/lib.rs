//! Core types and trait definitions for Mixtape.
//!
//! This crate is deliberately free of HTTP and runtime dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod friendship;
pub mod message;
pub mod profile;
pub mod score;
pub mod service;
pub mod session;

pub use error::{Error, Result};
pub use friendship::EdgeState;
pub use message::{Message, NewMessage};
pub use profile::{Profile, ProfileId};
pub use score::score;
pub use session::Session;
