//! Whiskey records — the only entity in the inventory.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Identifier ──────────────────────────────────────────────────────────────

/// Primary key of a [`Whiskey`]. Immutable once assigned and never reused.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WhiskeyId(String);

impl WhiskeyId {
  /// Wrap an existing identifier, e.g. one read back from storage.
  pub fn parse(raw: impl Into<String>) -> Result<Self> {
    let raw = raw.into();
    if raw.trim().is_empty() {
      return Err(Error::EmptyId);
    }
    Ok(Self(raw))
  }

  /// Wrap a value produced by an [`IdGenerator`](crate::id::IdGenerator),
  /// which never yields an empty string.
  pub(crate) fn generated(raw: String) -> Self { Self(raw) }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn into_string(self) -> String { self.0 }
}

impl fmt::Display for WhiskeyId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

// ─── Draft ───────────────────────────────────────────────────────────────────

/// The user-editable fields of a whiskey, without identity or timestamps.
///
/// This is what the form yields and what seed data is made of.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhiskeyDraft {
  pub name:     String,
  pub country:  String,
  /// Free text; not required to be numeric.
  pub age:      String,
  #[serde(default)]
  pub is_owned: bool,
}

impl WhiskeyDraft {
  /// Attach an identifier, producing a record ready to be written.
  pub fn into_whiskey(self, id: WhiskeyId) -> Whiskey {
    Whiskey {
      id,
      name: self.name,
      country: self.country,
      age: self.age,
      is_owned: self.is_owned,
      last_edit: None,
    }
  }
}

// ─── Whiskey ─────────────────────────────────────────────────────────────────

/// One inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Whiskey {
  pub id:        WhiskeyId,
  pub name:      String,
  pub country:   String,
  pub age:       String,
  pub is_owned:  bool,
  /// Store-assigned time of the last write. `None` for records written
  /// before the schema carried the column.
  pub last_edit: Option<DateTime<Utc>>,
}

impl Whiskey {
  /// The numeric key used by the age index, if `age` is a plain
  /// non-negative integer.
  pub fn age_key(&self) -> Option<u32> { age_key(&self.age) }

  /// Strip identity and timestamp, keeping only the editable fields.
  pub fn draft(&self) -> WhiskeyDraft {
    WhiskeyDraft {
      name:     self.name.clone(),
      country:  self.country.clone(),
      age:      self.age.clone(),
      is_owned: self.is_owned,
    }
  }
}

/// Parse free-text age into the index key. Surrounding whitespace is ignored;
/// anything else that is not a `u32` has no key.
pub fn age_key(age: &str) -> Option<u32> { age.trim().parse().ok() }
