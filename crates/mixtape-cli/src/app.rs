//! Application state machine and event dispatcher.

use std::{sync::Arc, time::Duration};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use mixtape_client::ApiClient;
use mixtape_core::{NewMessage, Profile, Result};
use mixtape_match::{Candidate, FeedSnapshot, MatchController, MessageFeed};

use crate::settings::Settings;

pub type Matches = MatchController<ApiClient, ApiClient>;

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// Swipe through candidates one at a time.
  Discover,
  /// The friends list with a profile pane.
  Friends,
  /// The shared chat board.
  Chat,
}

impl Screen {
  pub const ALL: [Screen; 3] = [Screen::Discover, Screen::Friends, Screen::Chat];

  pub fn title(self) -> &'static str {
    match self {
      Screen::Discover => "Discover",
      Screen::Friends => "Friends",
      Screen::Chat => "Chat",
    }
  }

  fn next(self) -> Self {
    match self {
      Screen::Discover => Screen::Friends,
      Screen::Friends => Screen::Chat,
      Screen::Chat => Screen::Discover,
    }
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub screen: Screen,

  pub matches: Matches,

  /// Running only while the chat screen is shown.
  pub feed: Option<MessageFeed<ApiClient>>,

  client:      Arc<ApiClient>,
  chat_poll:   Duration,
  chat_name:   String,
  chat_avatar: String,

  /// Text being typed into the chat input line.
  pub chat_input: String,

  /// Search query over candidates on the discover screen.
  pub filter: String,

  /// Whether the user is typing a search query.
  pub filter_active: bool,

  /// Cursor within the friends list.
  pub friends_cursor: usize,

  /// Profile shown in the friends screen's right pane, with its freshly
  /// read friendship.
  pub selected: Option<(Profile, bool)>,

  /// One-line status message shown in the status bar.
  pub status_msg: String,
}

impl App {
  pub fn new(client: Arc<ApiClient>, matches: Matches, settings: &Settings) -> Self {
    Self {
      screen: Screen::Discover,
      matches,
      feed: None,
      client,
      chat_poll: settings.chat_poll(),
      chat_name: settings.chat_name.clone(),
      chat_avatar: settings.chat_avatar.clone(),
      chat_input: String::new(),
      filter: String::new(),
      filter_active: false,
      friends_cursor: 0,
      selected: None,
      status_msg: String::new(),
    }
  }

  /// Absolute URL of a profile picture.
  pub fn asset_url(&self, path: &str) -> String { self.client.asset_url(path) }

  pub fn user_label(&self) -> String { format!("user {}", self.matches.session().user_id()) }

  /// Candidates shown in the discover list: search results while a query
  /// is set, otherwise best matches first.
  pub fn listed_candidates(&self) -> Vec<Candidate> {
    if self.filter.is_empty() {
      self.matches.ranked_matches()
    } else {
      self.matches.search(&self.filter)
    }
  }

  pub fn chat(&self) -> FeedSnapshot {
    self.feed.as_ref().map(MessageFeed::snapshot).unwrap_or_default()
  }

  /// Record a finished action in the status bar. Errors are also kept by
  /// the controller, which the status bar shows separately.
  fn report<T>(&mut self, done: &str, result: Result<T>) -> Option<T> {
    match result {
      Ok(v) => {
        self.status_msg = done.to_owned();
        Some(v)
      }
      Err(e) => {
        tracing::warn!(error = %e, "{done} failed");
        self.status_msg.clear();
        None
      }
    }
  }

  // ── Screen lifecycle ──────────────────────────────────────────────────────

  pub async fn mount_discover(&mut self) {
    self.status_msg = "Loading profiles…".into();
    let loaded = self.matches.load_candidates().await;
    self.report("Profiles loaded", loaded);
  }

  async fn mount_friends(&mut self) {
    let loaded = self.matches.load_friends().await;
    self.report("Friends loaded", loaded);
    self.friends_cursor = 0;
    self.selected = None;
  }

  fn mount_chat(&mut self) {
    self.feed = Some(MessageFeed::start(Arc::clone(&self.client), self.chat_poll));
  }

  async fn switch_to(&mut self, screen: Screen) {
    if screen == self.screen {
      return;
    }
    match self.screen {
      Screen::Discover => self.matches.unmount(),
      Screen::Chat => {
        if let Some(feed) = self.feed.take() {
          feed.stop();
        }
      }
      Screen::Friends => self.selected = None,
    }
    self.screen = screen;
    self.status_msg.clear();
    match screen {
      Screen::Discover => self.mount_discover().await,
      Screen::Friends => self.mount_friends().await,
      Screen::Chat => self.mount_chat(),
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }
    if key.code == KeyCode::Tab {
      self.switch_to(self.screen.next()).await;
      return true;
    }

    if self.filter_active {
      self.handle_filter_key(key);
      return true;
    }

    match self.screen {
      Screen::Discover => self.handle_discover_key(key).await,
      Screen::Friends => self.handle_friends_key(key).await,
      Screen::Chat => self.handle_chat_key(key).await,
    }
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
      }
      KeyCode::Enter => self.filter_active = false,
      KeyCode::Backspace => {
        self.filter.pop();
      }
      KeyCode::Char(c) => self.filter.push(c),
      _ => {}
    }
  }

  async fn handle_discover_key(&mut self, key: KeyEvent) -> bool {
    let current = self.matches.current().map(|c| c.profile.id);
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('y') => {
        if let Some(id) = current {
          let liked = self.matches.like(id).await;
          self.report("Liked ♥", liked);
        }
      }
      KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('n') => {
        if let Some(id) = current {
          let passed = self.matches.dislike(id).await;
          self.report("Passed", passed);
        }
      }
      KeyCode::Char(' ') => {
        self.matches.advance_cursor();
        self.status_msg.clear();
      }
      KeyCode::Char('r') => self.mount_discover().await,
      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
      }
      KeyCode::Char('2') => self.switch_to(Screen::Friends).await,
      KeyCode::Char('3') => self.switch_to(Screen::Chat).await,
      _ => {}
    }
    true
  }

  async fn handle_friends_key(&mut self, key: KeyEvent) -> bool {
    let friends = self.matches.friends();
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Down | KeyCode::Char('j') => {
        if self.friends_cursor + 1 < friends.len() {
          self.friends_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.friends_cursor = self.friends_cursor.saturating_sub(1);
      }
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some(id) = friends.get(self.friends_cursor).map(|p| p.id) {
          self.open_profile(id).await;
        }
      }
      KeyCode::Char('x') | KeyCode::Delete => {
        if let Some(friend) = friends.get(self.friends_cursor) {
          let removed = self.matches.remove_friend_and_refresh(friend.id).await;
          let done = format!("Removed {}", friend.display_name);
          if self.report(&done, removed).is_some() {
            self.selected = None;
            let len = self.matches.friends().len();
            self.friends_cursor = self.friends_cursor.min(len.saturating_sub(1));
          }
        }
      }
      KeyCode::Char('r') => self.mount_friends().await,
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => self.selected = None,
      KeyCode::Char('1') => self.switch_to(Screen::Discover).await,
      KeyCode::Char('3') => self.switch_to(Screen::Chat).await,
      _ => {}
    }
    true
  }

  async fn open_profile(&mut self, id: mixtape_core::ProfileId) {
    let viewed = self.matches.view_profile(id).await;
    let Some(profile) = self.report("Profile loaded", viewed) else {
      return;
    };
    let status = self.matches.refresh_friend_status(id).await;
    let is_friend = self.report("Profile loaded", status).unwrap_or_else(|| self.matches.friend_status(id));
    self.selected = Some((profile, is_friend));
  }

  async fn handle_chat_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Esc => self.switch_to(Screen::Discover).await,
      KeyCode::Enter => {
        if self.chat_input.trim().is_empty() {
          return true;
        }
        let message = NewMessage::new(&self.chat_name, &self.chat_input, &self.chat_avatar)
          .with_timestamp(chrono::Local::now().to_rfc3339());
        if let Some(feed) = &self.feed {
          match feed.post(message).await {
            Ok(_) => {
              self.chat_input.clear();
              self.status_msg = "Posted".into();
            }
            Err(e) => self.status_msg = format!("Error: {e}"),
          }
        }
      }
      KeyCode::Backspace => {
        self.chat_input.pop();
      }
      KeyCode::Char(c) => self.chat_input.push(c),
      _ => {}
    }
    true
  }
}
