//! Async HTTP client for the Mixtape REST API.
//!
//! [`ApiClient`] implements every collaborator trait from
//! [`mixtape_core::service`], mapping HTTP failures into
//! [`mixtape_core::Error`]:
//!
//! | Status | Error |
//! |--------|-------|
//! | 401, 403 | `Auth` |
//! | 404 | `NotFound` |
//! | 5xx | `Server` |
//! | other non-2xx, transport, decode | `Fetch` |
//! | client timeout | `Timeout` |

mod wire;

use std::time::Duration;

use mixtape_core::{
  Error, Message, NewMessage, Profile, ProfileId, Result, Session,
  service::{FriendshipService, MessageService, ProfileRegistry},
};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use wire::{ErrorBody, FriendStatusBody, LoginBody, LoginResponse, ProfileBody};

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Connection settings for the Mixtape API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  /// Overall per-request timeout enforced by the HTTP client.
  pub timeout:  Duration,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self { base_url: DEFAULT_BASE_URL.to_owned(), timeout: Duration::from_secs(30) }
  }
}

/// Async HTTP client for the Mixtape JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:  Client,
  config:  ApiConfig,
  session: Option<Session>,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(|e| Error::Fetch(format!("failed to build HTTP client: {e}")))?;
    Ok(Self { client, config, session: None })
  }

  /// A copy of this client that authenticates as `session`.
  pub fn with_session(&self, session: Session) -> Self {
    Self { session: Some(session), ..self.clone() }
  }

  pub fn session(&self) -> Option<&Session> { self.session.as_ref() }

  /// Resolve a server-relative asset path (e.g. a profile image) against the
  /// base URL. Absolute URLs are returned unchanged.
  pub fn asset_url(&self, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
      path.to_owned()
    } else {
      format!("{}{}", self.base(), path)
    }
  }

  fn base(&self) -> &str { self.config.base_url.trim_end_matches('/') }

  fn url(&self, path: &str) -> String { format!("{}{}", self.base(), path) }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    match &self.session {
      Some(s) if !s.token().is_empty() => req.bearer_auth(s.token()),
      _ => req,
    }
  }

  /// Send `req`, mapping transport and status failures into the taxonomy.
  async fn send(&self, req: RequestBuilder, what: &str) -> Result<Response> {
    debug!(request = what, "sending");
    let resp = self.auth(req).send().await.map_err(|e| self.transport(what, e))?;

    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
      .ok()
      .and_then(ErrorBody::into_message)
      .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_owned());
    debug!(request = what, status = status.as_u16(), %message, "request failed");
    Err(Error::from_status(status.as_u16(), format!("{what}: {message}")))
  }

  async fn json<T: DeserializeOwned>(&self, resp: Response, what: &str) -> Result<T> {
    resp
      .json()
      .await
      .map_err(|e| Error::Fetch(format!("deserialising {what}: {e}")))
  }

  fn transport(&self, what: &str, e: reqwest::Error) -> Error {
    if e.is_timeout() {
      Error::Timeout(self.config.timeout)
    } else {
      Error::Fetch(format!("{what} failed: {e}"))
    }
  }

  // ── Auth ──────────────────────────────────────────────────────────────────

  /// `POST /api/login` — exchange credentials for a [`Session`].
  pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
    let what = "POST /api/login";
    let req = self
      .client
      .post(self.url("/api/login"))
      .json(&LoginBody { username, password });
    let resp = self.send(req, what).await?;
    let body: LoginResponse = self.json(resp, "login response").await?;
    Ok(Session::new(body.user_id, body.token))
  }
}

// ─── Profiles ─────────────────────────────────────────────────────────────────

impl ProfileRegistry for ApiClient {
  /// `GET /api/users`
  async fn list_profiles(&self) -> Result<Vec<Profile>> {
    let what = "GET /api/users";
    let resp = self.send(self.client.get(self.url("/api/users")), what).await?;
    let bodies: Vec<ProfileBody> = self.json(resp, "profiles").await?;
    Ok(bodies.into_iter().map(Profile::from).collect())
  }

  /// `GET /api/users/{id}`
  async fn get_profile(&self, id: ProfileId) -> Result<Profile> {
    let what = format!("GET /api/users/{id}");
    let resp = self
      .send(self.client.get(self.url(&format!("/api/users/{id}"))), &what)
      .await?;
    let body: ProfileBody = self.json(resp, "profile").await?;
    Ok(body.into())
  }
}

// ─── Friendships ──────────────────────────────────────────────────────────────

impl FriendshipService for ApiClient {
  /// `GET /api/users/{user}/friends`
  async fn list_friends(&self, user: ProfileId) -> Result<Vec<Profile>> {
    let path = format!("/api/users/{user}/friends");
    let what = format!("GET {path}");
    let resp = self.send(self.client.get(self.url(&path)), &what).await?;
    let bodies: Vec<ProfileBody> = self.json(resp, "friends").await?;
    Ok(bodies.into_iter().map(Profile::from).collect())
  }

  /// `GET /api/users/{user}/friends/{profile}/status`
  async fn friend_status(&self, user: ProfileId, profile: ProfileId) -> Result<bool> {
    let path = format!("/api/users/{user}/friends/{profile}/status");
    let what = format!("GET {path}");
    let resp = self.send(self.client.get(self.url(&path)), &what).await?;
    let body: FriendStatusBody = self.json(resp, "friend status").await?;
    Ok(body.is_friend)
  }

  /// `POST /api/users/{user}/friends/{profile}`
  async fn add_friend(&self, user: ProfileId, profile: ProfileId) -> Result<()> {
    let path = format!("/api/users/{user}/friends/{profile}");
    let what = format!("POST {path}");
    self.send(self.client.post(self.url(&path)), &what).await?;
    Ok(())
  }

  /// `DELETE /api/users/{user}/friends/{profile}`
  async fn remove_friend(&self, user: ProfileId, profile: ProfileId) -> Result<()> {
    let path = format!("/api/users/{user}/friends/{profile}");
    let what = format!("DELETE {path}");
    self.send(self.client.delete(self.url(&path)), &what).await?;
    Ok(())
  }
}

// ─── Messages ─────────────────────────────────────────────────────────────────

impl MessageService for ApiClient {
  /// `GET /messages`
  async fn list_messages(&self) -> Result<Vec<Message>> {
    let what = "GET /messages";
    let resp = self.send(self.client.get(self.url("/messages")), what).await?;
    self.json(resp, "messages").await
  }

  /// `POST /messages`
  async fn post_message(&self, message: NewMessage) -> Result<Message> {
    let what = "POST /messages";
    let req = self.client.post(self.url("/messages")).json(&message);
    let resp = self.send(req, what).await?;
    self.json(resp, "posted message").await
  }
}

#[cfg(test)]
mod tests;
