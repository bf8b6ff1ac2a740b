//! `mixtape` — terminal client for the Mixtape music social board.
//!
//! # Usage
//!
//! ```
//! mixtape --url http://localhost:5000 --username britney --password toxic
//! mixtape --config ~/.config/mixtape/config.toml --log-file mixtape.log
//! ```

mod app;
mod settings;
mod ui;

use std::{
  fs::OpenOptions,
  io,
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::{Context, Result, bail};
use app::App;
use clap::Parser;
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use mixtape_client::{ApiClient, ApiConfig};
use mixtape_match::{MatchConfig, MatchController};
use ratatui::{Terminal, backend::CrosstermBackend};
use settings::{Overrides, Settings};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "mixtape", version, about = "Terminal client for the Mixtape board")]
struct Args {
  /// Path to a TOML settings file.
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Append logs to this file. The terminal belongs to the UI, so nothing
  /// is logged without it.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,

  #[command(flatten)]
  overrides: Overrides,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(path) = &args.log_file {
    init_logging(path)?;
  }

  let settings = Settings::load(args.config.as_ref(), &args.overrides)?;

  let client = ApiClient::new(ApiConfig {
    base_url: settings.url.clone(),
    timeout:  settings.http_timeout(),
  })?;

  let session = match settings.session() {
    Some(session) => session,
    None if settings.username.is_empty() => {
      bail!("no session configured: set user_id and token, or username and password")
    }
    None => client
      .login(&settings.username, settings.password())
      .await
      .with_context(|| format!("logging in as {}", settings.username))?,
  };
  tracing::info!(user = %session.user_id(), url = %settings.url, "session ready");

  let client = Arc::new(client.with_session(session.clone()));
  let matches = MatchController::new(
    session,
    Arc::clone(&client),
    Arc::clone(&client),
    MatchConfig { timeout: settings.request_timeout() },
  );
  let mut app = App::new(client, matches, &settings);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  app.mount_discover().await;
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

fn init_logging(path: &Path) -> Result<()> {
  let file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .with_context(|| format!("opening log file {}", path.display()))?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_ansi(false)
    .with_writer(std::sync::Mutex::new(file))
    .init();
  Ok(())
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && !app.handle_key(key).await
    {
      break;
    }
  }

  Ok(())
}
