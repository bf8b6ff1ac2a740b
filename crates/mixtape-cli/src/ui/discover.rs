//! Discover screen — ranked candidate list and the current profile card.

use mixtape_match::Candidate;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap},
};

use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
    .split(area);

  draw_list(f, cols[0], app);
  draw_card(f, cols[1], app);
}

// ─── Candidate list ───────────────────────────────────────────────────────────

fn draw_list(f: &mut Frame, area: Rect, app: &App) {
  let listed = app.listed_candidates();
  let current = app.matches.current().map(|c| c.profile.id);
  let liked = app.matches.liked();

  let title = if app.filter_active || !app.filter.is_empty() {
    format!(" Search: {}{} ({}) ", app.filter, if app.filter_active { "_" } else { "" }, listed.len())
  } else {
    format!(" Best matches ({}) ", listed.len())
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let items: Vec<ListItem> = listed
    .iter()
    .map(|c| {
      let style = if Some(c.profile.id) == current {
        Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD)
      } else {
        Style::default()
      };
      let marker = if liked.iter().any(|(id, _)| *id == c.profile.id) {
        "♥ "
      } else if c.is_friend {
        "☺ "
      } else {
        "  "
      };
      ListItem::new(Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Magenta)),
        Span::styled(format!("{:>3}% ", c.score), Style::default().fg(Color::Cyan)),
        Span::styled(c.profile.display_name.clone(), style),
      ]))
    })
    .collect();

  f.render_widget(List::new(items).block(block), area);
}

// ─── Profile card ─────────────────────────────────────────────────────────────

fn draw_card(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(" Profile ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Magenta));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let Some(candidate) = app.matches.current() else {
    let hint = if app.matches.is_mounted() {
      "Nobody here yet."
    } else {
      "Press r to load profiles."
    };
    f.render_widget(Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)), inner);
    return;
  };

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(1), Constraint::Min(0)])
    .split(inner);

  f.render_widget(
    Gauge::default()
      .gauge_style(Style::default().fg(Color::Magenta))
      .percent(u16::from(candidate.score))
      .label(format!("{}% compatible", candidate.score)),
    rows[0],
  );
  f.render_widget(
    Paragraph::new(card_lines(&candidate, app)).wrap(Wrap { trim: false }),
    rows[1],
  );
}

fn card_lines(c: &Candidate, app: &App) -> Vec<Line<'static>> {
  let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
  let p = &c.profile;
  let mut lines = vec![
    Line::from(""),
    Line::from(vec![
      Span::styled(p.display_name.clone(), Style::default().add_modifier(Modifier::BOLD)),
      Span::styled(format!("  @{}", p.username), Style::default().fg(Color::DarkGray)),
    ]),
  ];
  if c.is_friend {
    lines.push(Line::from(Span::styled("☺ friends", Style::default().fg(Color::Green))));
  }
  let edge = app.matches.edge_state(p.id);
  if edge.is_pending() {
    lines.push(Line::from(Span::styled(
      format!("… {edge:?}"),
      Style::default().fg(Color::Yellow),
    )));
  }
  lines.push(Line::from(""));
  if !p.bio.is_empty() {
    lines.push(Line::from(p.bio.clone()));
    lines.push(Line::from(""));
  }
  if !p.favorite_genres.is_empty() {
    let genres: Vec<&str> = p.favorite_genres.iter().map(String::as_str).collect();
    lines.push(Line::from(vec![
      Span::styled(format!("{:<10}", "genres"), label),
      Span::raw(genres.join(", ")),
    ]));
  }
  if !p.top_artists.is_empty() {
    lines.push(Line::from(vec![
      Span::styled(format!("{:<10}", "artists"), label),
      Span::raw(p.top_artists.join(", ")),
    ]));
  }
  lines
}
