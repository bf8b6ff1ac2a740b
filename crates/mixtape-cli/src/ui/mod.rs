//! TUI rendering — orchestrates all panes.

pub mod chat;
pub mod discover;
pub mod friends;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0], app);
  match app.screen {
    Screen::Discover => discover::draw(f, rows[1], app),
    Screen::Friends => friends::draw(f, rows[1], app),
    Screen::Chat => chat::draw(f, rows[1], app),
  }
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let mut spans = vec![Span::styled(
    " ★ mixtape ★ ",
    Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
  )];
  for (i, screen) in Screen::ALL.iter().enumerate() {
    let style = if *screen == app.screen {
      Style::default().fg(Color::Black).bg(Color::Magenta)
    } else {
      Style::default().fg(Color::White)
    };
    spans.push(Span::styled(format!(" {} {} ", i + 1, screen.title()), style));
  }

  let right = format!("{}  {} ", app.user_label(), Local::now().format("%H:%M"));
  let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
  let pad = (area.width as usize).saturating_sub(used + right.chars().count());
  spans.push(Span::raw(" ".repeat(pad)));
  spans.push(Span::styled(right, Style::default().fg(Color::Gray)));

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(Line::from(spans)), inner);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match app.screen {
    Screen::Discover if app.filter_active => ("SEARCH", "Type to filter  Esc clear  Enter done"),
    Screen::Discover => ("SWIPE", "→/l like  ←/h pass  Space skip  / search  r reload  Tab next  q quit"),
    Screen::Friends => ("FRIENDS", "↑↓/jk navigate  Enter profile  x remove  r reload  Tab next  q quit"),
    Screen::Chat => ("CHAT", "Type a message  Enter send  Esc leave  Tab next"),
  };

  let mut spans = vec![Span::styled(
    format!(" {mode_label} "),
    Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
  )];

  if app.matches.friend_status_may_be_stale() {
    spans.push(Span::styled(
      " friend status may be out of date ",
      Style::default().fg(Color::Black).bg(Color::Yellow),
    ));
  }

  let (text, color) = match app.matches.last_error() {
    Some(e) => (format!("  Error: {e}"), Color::Red),
    None if !app.status_msg.is_empty() => (format!("  {}", app.status_msg), Color::Green),
    None => (format!("  {hints}"), Color::DarkGray),
  };
  spans.push(Span::styled(text, Style::default().fg(color)));

  f.render_widget(
    Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black)),
    area,
  );
}
