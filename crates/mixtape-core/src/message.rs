//! Chat board messages.

use serde::{Deserialize, Serialize};

/// Name used when a message is posted without one.
pub const ANONYMOUS: &str = "Anonymous";

/// Avatar the board assigns when a message is posted without one.
pub const DEFAULT_AVATAR: &str = "https://i.imgur.com/MZ3Wy6Y.gif";

/// A message as stored by the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
  #[serde(default)]
  pub user:      String,
  pub message:   String,
  #[serde(default)]
  pub avatar:    String,
  /// Decorative overlay image drawn over the avatar.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub glitter:   Option<String>,
  /// ISO-8601 local time as reported by the board.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub timestamp: Option<String>,
}

/// Input to [`crate::service::MessageService::post_message`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMessage {
  pub user:      String,
  pub message:   String,
  pub avatar:    String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub glitter:   Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub timestamp: Option<String>,
}

impl NewMessage {
  /// Blank names fall back to [`ANONYMOUS`] and blank avatars to
  /// [`DEFAULT_AVATAR`]; the text is trimmed.
  pub fn new(user: &str, message: &str, avatar: &str) -> Self {
    let user = user.trim();
    let avatar = avatar.trim();
    Self {
      user:      if user.is_empty() { ANONYMOUS } else { user }.to_owned(),
      message:   message.trim().to_owned(),
      avatar:    if avatar.is_empty() { DEFAULT_AVATAR } else { avatar }
        .to_owned(),
      glitter:   None,
      timestamp: None,
    }
  }

  pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
    self.timestamp = Some(timestamp.into());
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_fields_take_board_defaults() {
    let m = NewMessage::new("  ", " hi there ", "");
    assert_eq!(m.user, ANONYMOUS);
    assert_eq!(m.message, "hi there");
    assert_eq!(m.avatar, DEFAULT_AVATAR);
  }

  #[test]
  fn stored_message_tolerates_missing_optional_fields() {
    let m: Message =
      serde_json::from_str(r#"{"user":"a","message":"b","avatar":"c"}"#).unwrap();
    assert_eq!(m.glitter, None);
    assert_eq!(m.timestamp, None);
  }
}
