//! Whiskey list pane — right panel.

use std::ops::Bound;

use cellar_core::{list::ListView, store::{ListQuery, WhiskeyStore}};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::Line,
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::app::{App, Focus};

/// Render the list into `area`.
pub fn draw<S: WhiskeyStore>(f: &mut Frame, area: Rect, app: &App<S>) {
  let focused = app.focus == Focus::List;

  let title = match (app.list.view(), describe(&app.query)) {
    (ListView::Loading, _) => " Whiskeys ".to_string(),
    (ListView::Ready(entries), None) => format!(" Whiskeys ({}) ", entries.len()),
    (ListView::Ready(entries), Some(filter)) => {
      format!(" Whiskeys ({}, {filter}) ", entries.len())
    }
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(if focused {
      Style::default().fg(Color::Cyan)
    } else {
      Style::default().fg(Color::DarkGray)
    });

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  // Filter input line at the bottom while typing.
  if app.filter_active && inner_area.height > 2 {
    let filter_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height = inner_area.height.saturating_sub(1);

    f.render_widget(
      Paragraph::new(format!("age ≥ {}_", app.filter)).style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  let items: Vec<ListItem> = app
    .list
    .lines()
    .into_iter()
    .map(|line| ListItem::new(Line::from(line.to_string())))
    .collect();

  let mut state = ListState::default();
  state.select(if app.list.entries().is_empty() || !focused {
    None
  } else {
    Some(app.list_cursor)
  });

  f.render_stateful_widget(
    List::new(items)
      .highlight_style(
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol(""),
    inner_area,
    &mut state,
  );
}

/// Short description of an active range.
pub fn describe(query: &ListQuery) -> Option<String> {
  match query {
    ListQuery::All => None,
    ListQuery::ByAge(range) => Some(match (&range.lower, &range.upper) {
      (Bound::Included(lo), Bound::Unbounded) => format!("age ≥ {lo}"),
      (Bound::Excluded(lo), Bound::Unbounded) => format!("age > {lo}"),
      _ => "age range".to_string(),
    }),
    ListQuery::ByName(_) => Some("name range".to_string()),
    ListQuery::ByCountry(_) => Some("country range".to_string()),
    ListQuery::ByLastEdit(_) => Some("recently edited".to_string()),
  }
}
