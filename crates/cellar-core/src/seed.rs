//! Initial records written into an empty store.

use crate::{
  Result,
  id::IdGenerator,
  store::{WhiskeyStore, WriteOp},
  whiskey::WhiskeyDraft,
};

/// `(name, country, age, is_owned)`
const DEFAULT_SEED: &[(&str, &str, &str, bool)] = &[
  ("Lagavulin", "Scotland", "16", true),
  ("Talisker", "Scotland", "10", false),
  ("Redbreast", "Ireland", "12", true),
  ("Yamazaki", "Japan", "12", false),
  ("Kavalan Solist", "Taiwan", "NAS", false),
  ("Highland Park", "Scotland", "18", false),
];

/// The built-in seed list.
pub fn default_drafts() -> Vec<WhiskeyDraft> {
  DEFAULT_SEED
    .iter()
    .map(|&(name, country, age, is_owned)| WhiskeyDraft {
      name: name.into(),
      country: country.into(),
      age: age.into(),
      is_owned,
    })
    .collect()
}

/// Parse a JSON array of drafts, e.g. the contents of a `seed_file`.
pub fn drafts_from_json(json: &str) -> Result<Vec<WhiskeyDraft>> {
  Ok(serde_json::from_str(json)?)
}

/// Insert `drafts` if, and only if, the store holds no records.
///
/// All drafts go in through `add` inside one transaction. Returns the number
/// of records inserted.
pub async fn seed_if_empty<S: WhiskeyStore>(
  store: &S,
  drafts: &[WhiskeyDraft],
  ids: &dyn IdGenerator,
) -> Result<usize, S::Error> {
  if drafts.is_empty() || store.count().await? > 0 {
    return Ok(0);
  }

  let ops: Vec<WriteOp> = drafts
    .iter()
    .cloned()
    .map(|draft| WriteOp::Add(draft.into_whiskey(ids.next_id())))
    .collect();

  Ok(store.commit(ops).await?.len())
}
