//! Application state machine and event dispatcher.

use cellar_core::{
  form::{self, Field, FormAction, FormState},
  id::IdGenerator,
  list::ListRenderer,
  store::{ListQuery, WhiskeyStore},
  whiskey::WhiskeyId,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

// ─── Focus ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
  /// One of the form's text inputs.
  Field(Field),
  /// The "owned" checkbox.
  Owned,
  /// The whiskey list.
  List,
}

impl Focus {
  const ORDER: [Focus; 5] = [
    Focus::Field(Field::Name),
    Focus::Field(Field::Country),
    Focus::Field(Field::Age),
    Focus::Owned,
    Focus::List,
  ];

  fn position(self) -> usize {
    Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
  }

  fn next(self) -> Self { Self::ORDER[(self.position() + 1) % Self::ORDER.len()] }

  fn prev(self) -> Self {
    Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<S: WhiskeyStore> {
  /// Current keyboard focus.
  pub focus: Focus,

  /// Field contents and editing marker.
  pub form: FormState,

  /// The visible list.
  pub list: ListRenderer,

  /// Cursor position within the list.
  pub list_cursor: usize,

  /// Range applied to every list query.
  pub query: ListQuery,

  /// Minimum-age text being typed (only while `filter_active`).
  pub filter: String,

  /// Whether the user is typing a filter.
  pub filter_active: bool,

  /// One-line message shown in the status bar.
  pub status_msg: String,

  store: S,
  ids:   Box<dyn IdGenerator>,
}

impl<S: WhiskeyStore> App<S> {
  pub fn new(store: S, ids: Box<dyn IdGenerator>, query: ListQuery) -> Self {
    Self {
      focus: Focus::Field(Field::Name),
      form: FormState::cleared(),
      list: ListRenderer::default(),
      list_cursor: 0,
      query,
      filter: String::new(),
      filter_active: false,
      status_msg: String::new(),
      store,
      ids,
    }
  }

  /// Give the store back, e.g. to close it on exit.
  pub fn into_store(self) -> S { self.store }

  // ── Store interaction ─────────────────────────────────────────────────────

  /// Re-run the list query and redraw the list. On failure the loading
  /// placeholder stays up.
  pub async fn refresh(&mut self) {
    self.list.begin_loading();
    match self.store.list(&self.query).await {
      Ok(records) => {
        self.list.render(&records);
        let len = self.list.entries().len();
        self.list_cursor = self.list_cursor.min(len.saturating_sub(1));
      }
      Err(e) => tracing::warn!(error = %e, "error getting whiskey list"),
    }
  }

  /// Apply a form action; if it yields a write, run it and, once its
  /// transaction has completed, refresh the list and reset the form.
  ///
  /// A failed write leaves the list and the form as they were.
  pub async fn dispatch(&mut self, action: FormAction) {
    let transition = form::transition(&self.form, action, self.ids.as_ref());
    self.form = transition.state;

    let Some(op) = transition.command else {
      return;
    };
    let kind = op.kind();
    let id = op.id().clone();

    match self.store.commit(vec![op]).await {
      Ok(_) => {
        tracing::info!(op = kind, %id, "transaction completed");
        self.refresh().await;
        self.form =
          form::transition(&self.form, FormAction::Committed, self.ids.as_ref()).state;
        self.status_msg = format!("{kind} {id}");
      }
      // The store has already reported the failure at the transaction boundary.
      Err(_) => tracing::debug!(op = kind, %id, "write not applied, form kept"),
    }
  }

  /// Load the record behind list entry `index` into the form.
  pub async fn select_entry(&mut self, index: usize) {
    let Some(id) = self.list.entry_id(index).cloned() else {
      return;
    };
    self.select(id).await;
  }

  async fn select(&mut self, id: WhiskeyId) {
    match self.store.get(id.clone()).await {
      Ok(Some(whiskey)) => self.dispatch(FormAction::Select(whiskey)).await,
      Ok(None) => tracing::warn!(%id, "selected whiskey no longer exists"),
      Err(e) => tracing::warn!(%id, error = %e, "error getting individual whiskey"),
    }
  }

  /// Replace the list query and refresh.
  pub async fn set_query(&mut self, query: ListQuery) {
    self.query = query;
    self.list_cursor = 0;
    self.refresh().await;
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> bool {
    // A status message lasts until the next key.
    self.status_msg.clear();

    if key.modifiers.contains(KeyModifiers::CONTROL) {
      match key.code {
        KeyCode::Char('c') => return false,
        KeyCode::Char('a') => self.dispatch(FormAction::Add).await,
        KeyCode::Char('u') => self.dispatch(FormAction::Update).await,
        KeyCode::Char('d') => self.dispatch(FormAction::Delete).await,
        KeyCode::Char('l') => self.dispatch(FormAction::Clear).await,
        _ => {}
      }
      return true;
    }

    if self.filter_active {
      self.handle_filter_key(key).await;
      return true;
    }

    match key.code {
      KeyCode::Tab => {
        self.focus = self.focus.next();
        return true;
      }
      KeyCode::BackTab => {
        self.focus = self.focus.prev();
        return true;
      }
      KeyCode::Esc => {
        self.dispatch(FormAction::Clear).await;
        return true;
      }
      _ => {}
    }

    match self.focus {
      Focus::Field(field) => self.handle_field_key(field, key).await,
      Focus::Owned => {
        if matches!(key.code, KeyCode::Char(' ') | KeyCode::Enter) {
          self.dispatch(FormAction::ToggleOwned).await;
        }
        true
      }
      Focus::List => self.handle_list_key(key).await,
    }
  }

  async fn handle_field_key(&mut self, field: Field, key: KeyEvent) -> bool {
    let mut text = self.form.fields.get(field).to_owned();
    match key.code {
      KeyCode::Char(c) => text.push(c),
      KeyCode::Backspace => {
        text.pop();
      }
      KeyCode::Enter => {
        self.focus = self.focus.next();
        return true;
      }
      _ => return true,
    }
    self.dispatch(FormAction::Edit(field, text)).await;
    true
  }

  async fn handle_list_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.list.entries().len();
        if len > 0 && self.list_cursor + 1 < len {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }

      KeyCode::Enter => self.select_entry(self.list_cursor).await,

      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
      }

      _ => {}
    }
    true
  }

  async fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
      }
      KeyCode::Enter => {
        self.filter_active = false;
        let query = match self.filter.parse::<u32>() {
          Ok(years) => ListQuery::min_age(years),
          Err(_) => ListQuery::All,
        };
        self.set_query(query).await;
      }
      KeyCode::Backspace => {
        self.filter.pop();
      }
      KeyCode::Char(c) if c.is_ascii_digit() => self.filter.push(c),
      _ => {}
    }
  }
}
