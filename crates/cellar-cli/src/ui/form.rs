//! Form pane — left panel.

use cellar_core::{form::Field, store::WhiskeyStore};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, Focus};

/// Render the form into `area`.
pub fn draw<S: WhiskeyStore>(f: &mut Frame, area: Rect, app: &App<S>) {
  let title = match &app.form.editing {
    Some(id) => format!(" Editing {id} "),
    None => " New whiskey ".to_string(),
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  // Three text inputs, the checkbox, then the rest.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(3),
      Constraint::Length(3),
      Constraint::Length(3),
      Constraint::Length(1),
      Constraint::Min(0),
    ])
    .split(inner);

  for (i, field) in Field::ALL.into_iter().enumerate() {
    draw_input(f, rows[i], app, field);
  }

  let owned_focused = app.focus == Focus::Owned;
  let mark = if app.form.fields.is_owned { "[x]" } else { "[ ]" };
  let style = if owned_focused {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
  } else {
    Style::default()
  };
  f.render_widget(
    Paragraph::new(Line::from(vec![Span::styled(format!(" {mark} Owned"), style)])),
    rows[3],
  );
}

fn draw_input<S: WhiskeyStore>(f: &mut Frame, area: Rect, app: &App<S>, field: Field) {
  let focused = app.focus == Focus::Field(field) && !app.filter_active;
  let text = app.form.fields.get(field);

  let block = Block::default()
    .title(format!(" {} ", field.label()))
    .borders(Borders::ALL)
    .border_style(if focused {
      Style::default().fg(Color::Cyan)
    } else {
      Style::default().fg(Color::DarkGray)
    });

  let shown = if focused { format!("{text}_") } else { text.to_string() };
  f.render_widget(Paragraph::new(shown).block(block), area);
}
