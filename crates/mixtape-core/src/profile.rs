//! Profile — the read-only snapshot of another user.
//!
//! Profiles are owned by the remote registry. The client only caches a
//! snapshot for the lifetime of a browsing session and never mutates it.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

/// Server-assigned profile identifier.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProfileId(pub i64);

impl fmt::Display for ProfileId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

impl From<i64> for ProfileId {
  fn from(id: i64) -> Self { Self(id) }
}

/// A user's public profile and music taste.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
  pub id:              ProfileId,
  pub username:        String,
  pub display_name:    String,
  pub bio:             String,
  /// Path or URL of the avatar, relative to the API base when it starts
  /// with `/`.
  pub profile_image:   Option<String>,
  /// Ordered most-listened first; order is ignored when scoring.
  pub top_artists:     Vec<String>,
  pub favorite_genres: BTreeSet<String>,
}

impl Profile {
  /// A bare profile with no bio, image or music taste.
  pub fn new(id: impl Into<ProfileId>, username: impl Into<String>) -> Self {
    let username = username.into();
    Self {
      id:              id.into(),
      display_name:    username.clone(),
      username,
      bio:             String::new(),
      profile_image:   None,
      top_artists:     Vec::new(),
      favorite_genres: BTreeSet::new(),
    }
  }

  pub fn with_genres<I, S>(mut self, genres: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.favorite_genres = genres.into_iter().map(Into::into).collect();
    self
  }

  pub fn with_artists<I, S>(mut self, artists: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.top_artists = artists.into_iter().map(Into::into).collect();
    self
  }

  pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
    self.bio = bio.into();
    self
  }

  /// Case-insensitive substring match over username, display name and bio.
  ///
  /// An empty (or all-whitespace) term matches every profile.
  pub fn matches(&self, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
      return true;
    }
    [&self.username, &self.display_name, &self.bio]
      .iter()
      .any(|field| field.to_lowercase().contains(&term))
  }
}
