//! JSON shapes exchanged with the backend, and their adaptation into core
//! types.
//!
//! The registry speaks `{id, username, description, profile_image}`. Older
//! front-end builds used other field names (`displayName`, `profilePic`,
//! `img`, `name`); those are accepted as aliases here so the core only ever
//! sees one [`Profile`] shape.

use mixtape_core::{Profile, ProfileId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileBody {
  pub id:              i64,
  pub username:        String,
  #[serde(default, alias = "displayName", alias = "name")]
  pub display_name:    Option<String>,
  #[serde(default, alias = "bio")]
  pub description:     Option<String>,
  #[serde(default, alias = "profilePic", alias = "img")]
  pub profile_image:   Option<String>,
  #[serde(default, alias = "topArtists")]
  pub top_artists:     Option<Vec<String>>,
  #[serde(default, alias = "favoriteGenres")]
  pub favorite_genres: Option<Vec<String>>,
}

impl From<ProfileBody> for Profile {
  fn from(b: ProfileBody) -> Self {
    let display_name = b
      .display_name
      .filter(|n| !n.trim().is_empty())
      .unwrap_or_else(|| b.username.clone());
    Profile {
      id: ProfileId(b.id),
      username: b.username,
      display_name,
      bio: b.description.unwrap_or_default(),
      profile_image: b.profile_image.filter(|p| !p.is_empty()),
      top_artists: b.top_artists.unwrap_or_default(),
      favorite_genres: b.favorite_genres.unwrap_or_default().into_iter().collect(),
    }
  }
}

/// `GET /api/users/{user}/friends/{id}/status`
#[derive(Debug, Deserialize)]
pub(crate) struct FriendStatusBody {
  pub is_friend: bool,
}

/// `POST /api/login` request.
#[derive(Debug, Serialize)]
pub(crate) struct LoginBody<'a> {
  pub username: &'a str,
  pub password: &'a str,
}

/// `POST /api/login` response.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
  pub token:   String,
  pub user_id: i64,
}

/// Error payloads: the registry uses `{"error": ...}`, the chat board uses
/// `{"status": "error", "message": ...}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
  pub error:   Option<String>,
  pub message: Option<String>,
}

impl ErrorBody {
  pub fn into_message(self) -> Option<String> { self.error.or(self.message) }
}
