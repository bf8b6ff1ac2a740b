//! Friends screen — friends list and the selected profile.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
    .split(area);

  draw_list(f, cols[0], app);
  draw_profile(f, cols[1], app);
}

fn draw_list(f: &mut Frame, area: Rect, app: &App) {
  let friends = app.matches.friends();
  let block = Block::default()
    .title(format!(" Friends ({}) ", friends.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  if friends.is_empty() {
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
      Paragraph::new("No friends yet. Like someone on Discover!")
        .style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let items: Vec<ListItem> = friends
    .iter()
    .map(|p| {
      let pending = app.matches.edge_state(p.id).is_pending();
      ListItem::new(Line::from(vec![
        Span::raw(p.display_name.clone()),
        Span::styled(if pending { "  …" } else { "" }, Style::default().fg(Color::Yellow)),
      ]))
    })
    .collect();

  let mut state = ListState::default();
  state.select(Some(app.friends_cursor));
  f.render_stateful_widget(
    List::new(items).block(block).highlight_style(
      Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD),
    ),
    area,
    &mut state,
  );
}

fn draw_profile(f: &mut Frame, area: Rect, app: &App) {
  let Some((profile, is_friend)) = &app.selected else {
    let block = Block::default()
      .title(" Profile ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
      Paragraph::new("Select a friend and press Enter.")
        .style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  };

  let block = Block::default()
    .title(format!(" {} ", profile.display_name))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Magenta));

  let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
  let mut lines = vec![
    Line::from(vec![Span::styled(format!("{:<10}", "username"), label), Span::raw(profile.username.clone())]),
    Line::from(vec![
      Span::styled(format!("{:<10}", "friend"), label),
      Span::raw(if *is_friend { "yes" } else { "no" }),
    ]),
  ];
  if let Some(image) = &profile.profile_image {
    lines.push(Line::from(vec![
      Span::styled(format!("{:<10}", "picture"), label),
      Span::styled(app.asset_url(image), Style::default().fg(Color::DarkGray)),
    ]));
  }
  if !profile.bio.is_empty() {
    lines.push(Line::from(""));
    lines.push(Line::from(profile.bio.clone()));
  }

  f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}
