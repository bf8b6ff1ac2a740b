//! Chat screen — the shared board and an input line.

use mixtape_core::Message;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Min(0), Constraint::Length(3)])
    .split(area);

  let snapshot = app.chat();
  let title = match &snapshot.last_error {
    Some(e) => format!(" Chat: {e} "),
    None => format!(" Chat ({}) ", snapshot.messages.len()),
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Magenta));

  let lines: Vec<Line> = snapshot.messages.iter().map(message_line).collect();
  // Keep the newest messages in view.
  let visible = rows[0].height.saturating_sub(2) as usize;
  let scroll = lines.len().saturating_sub(visible) as u16;
  f.render_widget(
    Paragraph::new(lines).block(block).wrap(Wrap { trim: false }).scroll((scroll, 0)),
    rows[0],
  );

  let input = Block::default()
    .title(" Say something ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  f.render_widget(Paragraph::new(format!("{}_", app.chat_input)).block(input), rows[1]);
}

fn message_line(m: &Message) -> Line<'static> {
  let mut spans = Vec::new();
  if let Some(ts) = m.timestamp.as_deref().and_then(|t| t.get(11..16)) {
    spans.push(Span::styled(format!("{ts} "), Style::default().fg(Color::DarkGray)));
  }
  spans.push(Span::styled(
    format!("{}: ", m.user),
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
  ));
  spans.push(Span::raw(m.message.clone()));
  Line::from(spans)
}
