//! The `WhiskeyStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `cellar-store-sqlite`).
//! The UI depends on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{
  range::KeyRange,
  whiskey::{Whiskey, WhiskeyId},
};

// ─── Indexes and queries ─────────────────────────────────────────────────────

/// Secondary (non-unique) indexes over the whiskey collection.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum IndexField {
  Name,
  Country,
  Age,
  LastEdit,
}

/// Parameters for [`WhiskeyStore::list`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListQuery {
  /// Every record, in primary-key order.
  #[default]
  All,
  ByName(KeyRange<String>),
  ByCountry(KeyRange<String>),
  /// Only records whose age is a plain integer can match.
  ByAge(KeyRange<u32>),
  /// Only records that carry a last-edit timestamp can match.
  ByLastEdit(KeyRange<DateTime<Utc>>),
}

impl ListQuery {
  /// Records aged `years` or more, youngest first.
  pub fn min_age(years: u32) -> Self { Self::ByAge(KeyRange::at_least(years)) }

  /// The index this query reads, or `None` for a full scan.
  pub fn index(&self) -> Option<IndexField> {
    match self {
      Self::All => None,
      Self::ByName(_) => Some(IndexField::Name),
      Self::ByCountry(_) => Some(IndexField::Country),
      Self::ByAge(_) => Some(IndexField::Age),
      Self::ByLastEdit(_) => Some(IndexField::LastEdit),
    }
  }

  /// Whether `whiskey` satisfies the range of this query.
  pub fn matches(&self, whiskey: &Whiskey) -> bool {
    match self {
      Self::All => true,
      Self::ByName(r) => r.contains(&whiskey.name),
      Self::ByCountry(r) => r.contains(&whiskey.country),
      Self::ByAge(r) => whiskey.age_key().is_some_and(|age| r.contains(&age)),
      Self::ByLastEdit(r) => whiskey.last_edit.is_some_and(|at| r.contains(&at)),
    }
  }
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// One write inside a [`WhiskeyStore::commit`] batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
  /// Insert; fails if the id is already present.
  Add(Whiskey),
  /// Insert or fully replace the record at the same id.
  Put(Whiskey),
  /// Remove; succeeds when the id is absent.
  Delete(WhiskeyId),
}

impl WriteOp {
  pub fn id(&self) -> &WhiskeyId {
    match self {
      Self::Add(w) | Self::Put(w) => &w.id,
      Self::Delete(id) => id,
    }
  }

  pub fn kind(&self) -> &'static str {
    match self {
      Self::Add(_) => "add",
      Self::Put(_) => "put",
      Self::Delete(_) => "delete",
    }
  }
}

/// Result of one [`WriteOp`] after its transaction committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
  /// The record as stored, with its `last_edit` stamp.
  Added(Whiskey),
  Put(Whiskey),
  Deleted { id: WhiskeyId, existed: bool },
}

// ─── Schema migration ────────────────────────────────────────────────────────

/// What to do with existing records when the schema version is raised.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MigrationPolicy {
  /// Transform the collection in place, keeping every record.
  #[default]
  Preserve,
  /// Drop the collection and recreate it at the new version. All records are
  /// lost.
  DropAndRecreate,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a whiskey store backend.
///
/// Every write runs inside a transaction, and the returned future resolves
/// only once that transaction has committed. Callers that refresh derived
/// state (the visible list, the form) must do so after awaiting it.
pub trait WhiskeyStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Apply every op in a single transaction. If any op fails, none of them
  /// take effect and the failure is reported once for the batch.
  fn commit(
    &self,
    ops: Vec<WriteOp>,
  ) -> impl Future<Output = Result<Vec<WriteOutcome>, Self::Error>> + Send + '_;

  /// Insert a new record. Returns an error if the id is already taken.
  fn add(
    &self,
    whiskey: Whiskey,
  ) -> impl Future<Output = Result<Whiskey, Self::Error>> + Send + '_;

  /// Insert or fully replace the record at `whiskey.id`.
  fn put(
    &self,
    whiskey: Whiskey,
  ) -> impl Future<Output = Result<Whiskey, Self::Error>> + Send + '_;

  /// Remove the record at `id`. Removing an absent id is not an error.
  fn delete(&self, id: WhiskeyId) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Retrieve a record by id. Returns `None` if not found.
  fn get(
    &self,
    id: WhiskeyId,
  ) -> impl Future<Output = Result<Option<Whiskey>, Self::Error>> + Send + '_;

  /// List records matching `query`, in primary-key order for
  /// [`ListQuery::All`] and in index order otherwise.
  fn list<'a>(
    &'a self,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Vec<Whiskey>, Self::Error>> + Send + 'a;

  /// Number of records in the collection.
  fn count(&self) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}
