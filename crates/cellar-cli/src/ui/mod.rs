//! TUI rendering — orchestrates all panes.

pub mod form;
pub mod whiskey_list;

use cellar_core::store::WhiskeyStore;
use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, Focus};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw<S: WhiskeyStore>(f: &mut Frame, app: &App<S>) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0]);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let left = Span::styled(
    " cellar  [^A] add  [^U] update  [^D] delete  [^L] clear",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(
    format!("{date} "),
    Style::default().fg(Color::DarkGray),
  );

  // Simple left-right header: pad the middle.
  let left_width = left.content.len() as u16;
  let right_width = right.content.len() as u16;
  let pad = area
    .width
    .saturating_sub(left_width)
    .saturating_sub(right_width);

  let line = Line::from(vec![
    left,
    Span::raw(" ".repeat(pad as usize)),
    right,
  ]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body<S: WhiskeyStore>(f: &mut Frame, area: Rect, app: &App<S>) {
  // Form on the left (40%), list on the right (60%).
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
    .split(area);

  form::draw(f, cols[0], app);
  whiskey_list::draw(f, cols[1], app);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status<S: WhiskeyStore>(f: &mut Frame, area: Rect, app: &App<S>) {
  let (mode_label, hints) = match app.focus {
    _ if app.filter_active => ("FILTER", "Type a minimum age  Esc cancel  Enter apply"),
    Focus::List => ("LIST", "↑↓/jk navigate  Enter edit  / min age  Tab form  q quit"),
    Focus::Owned => ("FORM", "Space toggle  Tab next  Esc clear"),
    Focus::Field(_) => ("FORM", "Type to edit  Tab next  Shift-Tab back  Esc clear"),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::DarkGray),
  );
  let filter_span = Span::styled(
    whiskey_list::describe(&app.query)
      .map(|filter| format!("  [{filter}]"))
      .unwrap_or_default(),
    Style::default().fg(Color::Yellow),
  );
  let line = Line::from(vec![mode_span, hint_span, filter_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
