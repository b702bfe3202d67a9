//! Encoding and decoding helpers between Rust domain types and the plain
//! values stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings so that text
//! order matches time order. Ids are stored verbatim. `is_owned` is 0/1.

use std::ops::Bound;

use cellar_core::{
  range::KeyRange,
  store::{ListQuery, WriteOp},
  whiskey::{Whiskey, WhiskeyId},
};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Value;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Columns selected for every whiskey read. At schema v1 `last_edit` is
/// selected as a NULL literal.
pub fn select_columns(has_last_edit: bool) -> &'static str {
  if has_last_edit {
    "id, name, country, age, is_owned, last_edit"
  } else {
    "id, name, country, age, is_owned, NULL AS last_edit"
  }
}

/// Raw values read directly from a `whiskey_store` row.
pub struct RawWhiskey {
  pub id:        String,
  pub name:      String,
  pub country:   String,
  pub age:       String,
  pub is_owned:  bool,
  pub last_edit: Option<String>,
}

impl RawWhiskey {
  /// Read a row selected with [`select_columns`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:        row.get(0)?,
      name:      row.get(1)?,
      country:   row.get(2)?,
      age:       row.get(3)?,
      is_owned:  row.get(4)?,
      last_edit: row.get(5)?,
    })
  }

  pub fn into_whiskey(self) -> Result<Whiskey> {
    Ok(Whiskey {
      id:        WhiskeyId::parse(self.id)?,
      name:      self.name,
      country:   self.country,
      age:       self.age,
      is_owned:  self.is_owned,
      last_edit: self.last_edit.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Owned column values for one write, ready to move onto the database
/// thread.
pub struct RawWrite {
  pub kind:      &'static str,
  pub id:        String,
  /// `None` for deletes.
  pub row:       Option<RawRow>,
  /// Whether a failed insert means the id was taken.
  pub insert:    bool,
}

pub struct RawRow {
  pub name:      String,
  pub country:   String,
  pub age:       String,
  pub is_owned:  bool,
  pub last_edit: Option<String>,
  pub age_key:   Option<u32>,
}

impl RawWrite {
  pub fn encode(op: &WriteOp, last_edit: Option<DateTime<Utc>>) -> Self {
    let row = |w: &Whiskey| RawRow {
      name:      w.name.clone(),
      country:   w.country.clone(),
      age:       w.age.clone(),
      is_owned:  w.is_owned,
      last_edit: last_edit.map(encode_dt),
      age_key:   w.age_key(),
    };
    let (row, insert) = match op {
      WriteOp::Add(w) => (Some(row(w)), true),
      WriteOp::Put(w) => (Some(row(w)), false),
      WriteOp::Delete(_) => (None, false),
    };
    Self { kind: op.kind(), id: op.id().to_string(), row, insert }
  }
}

// ─── Queries ─────────────────────────────────────────────────────────────────

/// The column backing the index a query reads, and its bounds as SQL values.
pub fn index_bounds(query: &ListQuery) -> Option<(&'static str, KeyRange<Value>)> {
  match query {
    ListQuery::All => None,
    ListQuery::ByName(r) => Some(("name", r.clone().map(Value::Text))),
    ListQuery::ByCountry(r) => Some(("country", r.clone().map(Value::Text))),
    ListQuery::ByAge(r) => Some(("age_key", r.clone().map(|k| Value::Integer(k.into())))),
    ListQuery::ByLastEdit(r) => {
      Some(("last_edit", r.clone().map(|dt| Value::Text(encode_dt(dt)))))
    }
  }
}

/// `WHERE` conditions for `range` over `column`, appending the bound values
/// to `params`.
pub fn range_conditions(
  column: &str,
  range: KeyRange<Value>,
  params: &mut Vec<Value>,
) -> Vec<String> {
  let mut conds = vec![format!("{column} IS NOT NULL")];
  let mut push = |op: &str, value: Value| {
    params.push(value);
    conds.push(format!("{column} {op} ?{}", params.len()));
  };
  match range.lower {
    Bound::Included(v) => push(">=", v),
    Bound::Excluded(v) => push(">", v),
    Bound::Unbounded => {}
  }
  match range.upper {
    Bound::Included(v) => push("<=", v),
    Bound::Excluded(v) => push("<", v),
    Bound::Unbounded => {}
  }
  conds
}
