//! Identifier generation for new records.
//!
//! Ids are produced without consulting storage. The store still rejects a
//! duplicate on `add`, so a collision surfaces as an error rather than an
//! overwrite.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

use crate::whiskey::WhiskeyId;

/// Source of fresh [`WhiskeyId`]s.
pub trait IdGenerator: Send + Sync {
  fn next_id(&self) -> WhiskeyId;
}

/// UUID v7 ids.
///
/// The uuid crate keeps a process-wide v7 context, so ids from one process
/// are strictly increasing and never repeat; the random tail keeps ids from
/// different processes apart.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeOrderedIds;

impl IdGenerator for TimeOrderedIds {
  fn next_id(&self) -> WhiskeyId {
    WhiskeyId::generated(Uuid::now_v7().hyphenated().to_string())
  }
}

/// Deterministic `"{prefix}-{n}"` ids, starting at 1.
#[derive(Debug)]
pub struct SequentialIds {
  prefix: String,
  next:   AtomicU64,
}

impl SequentialIds {
  pub fn new(prefix: impl Into<String>) -> Self {
    Self { prefix: prefix.into(), next: AtomicU64::new(1) }
  }
}

impl IdGenerator for SequentialIds {
  fn next_id(&self) -> WhiskeyId {
    let n = self.next.fetch_add(1, Ordering::Relaxed);
    WhiskeyId::generated(format!("{}-{n}", self.prefix))
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use super::*;

  #[test]
  fn time_ordered_ids_are_unique_and_increasing() {
    let ids = TimeOrderedIds;
    let generated: Vec<WhiskeyId> = (0..10_000).map(|_| ids.next_id()).collect();

    let distinct: HashSet<_> = generated.iter().collect();
    assert_eq!(distinct.len(), generated.len());
    assert!(generated.windows(2).all(|w| w[0] < w[1]));
  }

  #[test]
  fn sequential_ids_count_up() {
    let ids = SequentialIds::new("w");
    assert_eq!(ids.next_id().as_str(), "w-1");
    assert_eq!(ids.next_id().as_str(), "w-2");
    assert_eq!(ids.next_id().as_str(), "w-3");
  }
}
