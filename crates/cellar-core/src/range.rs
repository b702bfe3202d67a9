//! Ordered key ranges over a secondary index.

use std::ops::Bound;

/// A contiguous range of index keys, each end open, closed or unbounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange<K> {
  pub lower: Bound<K>,
  pub upper: Bound<K>,
}

impl<K> KeyRange<K> {
  pub fn bound(lower: Bound<K>, upper: Bound<K>) -> Self { Self { lower, upper } }

  /// Every key.
  pub fn unbounded() -> Self { Self::bound(Bound::Unbounded, Bound::Unbounded) }

  /// Exactly `key`.
  pub fn only(key: K) -> Self
  where
    K: Clone,
  {
    Self::bound(Bound::Included(key.clone()), Bound::Included(key))
  }

  /// `key` and everything above it.
  pub fn at_least(key: K) -> Self { Self::bound(Bound::Included(key), Bound::Unbounded) }

  pub fn greater_than(key: K) -> Self {
    Self::bound(Bound::Excluded(key), Bound::Unbounded)
  }

  /// `key` and everything below it.
  pub fn at_most(key: K) -> Self { Self::bound(Bound::Unbounded, Bound::Included(key)) }

  pub fn less_than(key: K) -> Self {
    Self::bound(Bound::Unbounded, Bound::Excluded(key))
  }

  /// Inclusive on both ends.
  pub fn between(lower: K, upper: K) -> Self {
    Self::bound(Bound::Included(lower), Bound::Included(upper))
  }

  /// Transform both bounds, e.g. to encode keys for a backend.
  pub fn map<T>(self, mut f: impl FnMut(K) -> T) -> KeyRange<T> {
    KeyRange { lower: map_bound(self.lower, &mut f), upper: map_bound(self.upper, &mut f) }
  }
}

impl<K: PartialOrd> KeyRange<K> {
  pub fn contains(&self, key: &K) -> bool {
    let above_lower = match &self.lower {
      Bound::Included(lo) => key >= lo,
      Bound::Excluded(lo) => key > lo,
      Bound::Unbounded => true,
    };
    let below_upper = match &self.upper {
      Bound::Included(hi) => key <= hi,
      Bound::Excluded(hi) => key < hi,
      Bound::Unbounded => true,
    };
    above_lower && below_upper
  }
}

fn map_bound<K, T>(bound: Bound<K>, f: &mut impl FnMut(K) -> T) -> Bound<T> {
  match bound {
    Bound::Included(k) => Bound::Included(f(k)),
    Bound::Excluded(k) => Bound::Excluded(f(k)),
    Bound::Unbounded => Bound::Unbounded,
  }
}
