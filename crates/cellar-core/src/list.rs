//! List renderer — the visible list of records.
//!
//! The renderer does not order concurrent queries: whichever result is
//! rendered last wins, even if it belongs to an older query.

use crate::whiskey::{Whiskey, WhiskeyId};

/// Placeholder shown while a list query is in flight.
pub const LOADING: &str = "Loading...";

/// One visible row, carrying the id of the record it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
  pub id:    WhiskeyId,
  pub label: String,
}

impl ListEntry {
  pub fn new(whiskey: &Whiskey) -> Self {
    Self { id: whiskey.id.clone(), label: label(whiskey) }
  }
}

/// `"{name} - {country} - {age}"`.
pub fn label(whiskey: &Whiskey) -> String {
  format!("{} - {} - {}", whiskey.name, whiskey.country, whiskey.age)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
  Loading,
  Ready(Vec<ListEntry>),
}

#[derive(Debug, Clone)]
pub struct ListRenderer {
  view: ListView,
}

impl Default for ListRenderer {
  fn default() -> Self { Self { view: ListView::Ready(Vec::new()) } }
}

impl ListRenderer {
  pub fn view(&self) -> &ListView { &self.view }

  /// Show the loading placeholder until the next [`render`](Self::render).
  pub fn begin_loading(&mut self) { self.view = ListView::Loading; }

  /// Replace the visible list with one entry per record, in the given order.
  pub fn render(&mut self, records: &[Whiskey]) {
    self.view = ListView::Ready(records.iter().map(ListEntry::new).collect());
  }

  pub fn is_loading(&self) -> bool { matches!(self.view, ListView::Loading) }

  pub fn entries(&self) -> &[ListEntry] {
    match &self.view {
      ListView::Loading => &[],
      ListView::Ready(entries) => entries,
    }
  }

  /// The id attached to the entry at `index`, the target of a selection.
  pub fn entry_id(&self, index: usize) -> Option<&WhiskeyId> {
    self.entries().get(index).map(|e| &e.id)
  }

  /// Text lines as they appear on screen.
  pub fn lines(&self) -> Vec<&str> {
    match &self.view {
      ListView::Loading => vec![LOADING],
      ListView::Ready(entries) => entries.iter().map(|e| e.label.as_str()).collect(),
    }
  }
}
