//! Layered client settings: TOML file, then `MIXTAPE_*` environment
//! variables, then command-line flags.

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use mixtape_client::DEFAULT_BASE_URL;
use mixtape_core::Session;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Flags that override every other settings source.
#[derive(clap::Args, Debug, Default)]
pub struct Overrides {
  /// Base URL of the Mixtape API (default: http://localhost:5000).
  #[arg(long, env = "MIXTAPE_URL")]
  pub url: Option<String>,

  /// Account to log in as when no token is configured.
  #[arg(long, env = "MIXTAPE_USERNAME")]
  pub username: Option<String>,

  #[arg(long, env = "MIXTAPE_PASSWORD", hide_env_values = true)]
  pub password: Option<String>,

  /// Reuse an existing session instead of logging in (needs --token).
  #[arg(long, env = "MIXTAPE_USER_ID")]
  pub user_id: Option<i64>,

  #[arg(long, env = "MIXTAPE_TOKEN", hide_env_values = true)]
  pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
  #[serde(default = "default_url")]
  pub url:                  String,
  #[serde(default)]
  pub username:             String,
  pub password:             Option<SecretString>,
  pub user_id:              Option<i64>,
  pub token:                Option<SecretString>,
  /// Per-call limit for friend mutations and reads in the match view.
  #[serde(default = "default_request_timeout")]
  pub request_timeout_secs: u64,
  /// Overall limit enforced by the HTTP client itself.
  #[serde(default = "default_http_timeout")]
  pub http_timeout_secs:    u64,
  #[serde(default = "default_chat_poll")]
  pub chat_poll_secs:       u64,
  /// Name shown on chat posts; defaults to the board's anonymous name.
  #[serde(default)]
  pub chat_name:            String,
  #[serde(default)]
  pub chat_avatar:          String,
}

fn default_url() -> String { DEFAULT_BASE_URL.to_owned() }
fn default_request_timeout() -> u64 { mixtape_match::DEFAULT_TIMEOUT.as_secs() }
fn default_http_timeout() -> u64 { 30 }
fn default_chat_poll() -> u64 { mixtape_match::DEFAULT_INTERVAL.as_secs() }

impl Settings {
  /// Read settings from `file` (if given), the environment and `overrides`.
  pub fn load(file: Option<&PathBuf>, overrides: &Overrides) -> Result<Self> {
    let mut builder = Config::builder();
    if let Some(path) = file {
      builder = builder.add_source(File::from(path.as_path()));
    }
    let builder = builder.add_source(Environment::with_prefix("MIXTAPE"));
    Self::layered(builder, overrides)
      .with_context(|| match file {
        Some(path) => format!("loading settings from {}", path.display()),
        None => "loading settings".to_owned(),
      })
  }

  fn layered(builder: ConfigBuilder<DefaultState>, o: &Overrides) -> Result<Self> {
    let settings = builder
      .set_override_option("url", o.url.clone())?
      .set_override_option("username", o.username.clone())?
      .set_override_option("password", o.password.clone())?
      .set_override_option("user_id", o.user_id)?
      .set_override_option("token", o.token.clone())?
      .build()?;
    Ok(settings.try_deserialize()?)
  }

  /// A ready-made session, if both a user id and a token are configured.
  pub fn session(&self) -> Option<Session> {
    match (self.user_id, &self.token) {
      (Some(id), Some(token)) if !token.expose_secret().is_empty() => {
        Some(Session::new(id, token.expose_secret().as_str()))
      }
      _ => None,
    }
  }

  pub fn password(&self) -> &str {
    self.password.as_ref().map(|p| p.expose_secret().as_str()).unwrap_or_default()
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs.max(1))
  }

  pub fn http_timeout(&self) -> Duration { Duration::from_secs(self.http_timeout_secs) }

  pub fn chat_poll(&self) -> Duration { Duration::from_secs(self.chat_poll_secs.max(1)) }
}
