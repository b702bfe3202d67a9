//! Integration tests for `SqliteStore` against in-memory and on-disk
//! databases.

use cellar_core::{
  id::{IdGenerator, SequentialIds},
  list::ListRenderer,
  range::KeyRange,
  seed,
  store::{IndexField, ListQuery, MigrationPolicy, WhiskeyStore, WriteOp, WriteOutcome},
  whiskey::{Whiskey, WhiskeyDraft, WhiskeyId},
};
use chrono::{Duration, Utc};
use strum::IntoEnumIterator as _;

use crate::{Error, SqliteStore, StoreOptions, LATEST_VERSION};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn whiskey(id: &str, name: &str, country: &str, age: &str) -> Whiskey {
  WhiskeyDraft {
    name:     name.into(),
    country:  country.into(),
    age:      age.into(),
    is_owned: false,
  }
  .into_whiskey(WhiskeyId::parse(id).unwrap())
}

fn lagavulin() -> Whiskey {
  Whiskey { is_owned: true, ..whiskey("w-1", "Lagavulin", "Scotland", "16") }
}

fn id(raw: &str) -> WhiskeyId { WhiskeyId::parse(raw).unwrap() }

fn names(records: &[Whiskey]) -> Vec<&str> {
  records.iter().map(|w| w.name.as_str()).collect()
}

async fn shelf(s: &SqliteStore) {
  s.commit(vec![
    WriteOp::Add(whiskey("a", "Talisker", "Scotland", "10")),
    WriteOp::Add(whiskey("b", "Redbreast", "Ireland", "12")),
    WriteOp::Add(whiskey("c", "Highland Park", "Scotland", "18")),
    WriteOp::Add(whiskey("d", "Kavalan", "Taiwan", "NAS")),
    WriteOp::Add(whiskey("e", "Oban", "Scotland", "14")),
  ])
  .await
  .unwrap();
}

// ─── Add / get ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_then_list_returns_exactly_that_record() {
  let s = store().await;

  let added = s.add(lagavulin()).await.unwrap();
  assert!(added.last_edit.is_some());

  let all = s.list(&ListQuery::All).await.unwrap();
  assert_eq!(all, vec![added]);
}

#[tokio::test]
async fn returned_stamp_matches_stored_stamp() {
  let s = store().await;

  let added = s.add(lagavulin()).await.unwrap();
  assert_eq!(s.get(id("w-1")).await.unwrap(), Some(added.clone()));

  let Some(stamp) = added.last_edit else {
    panic!("v2 store should stamp last_edit");
  };
  let exact = s.list(&ListQuery::ByLastEdit(KeyRange::only(stamp))).await.unwrap();
  assert_eq!(exact, vec![added]);

  let put = s.put(Whiskey { age: "18".into(), ..lagavulin() }).await.unwrap();
  let outcomes = s.commit(vec![WriteOp::Put(put.clone())]).await.unwrap();
  let [WriteOutcome::Put(committed)] = outcomes.as_slice() else {
    panic!("expected a single put outcome, got {outcomes:?}");
  };
  assert_eq!(s.get(id("w-1")).await.unwrap().as_ref(), Some(committed));
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get(id("nope")).await.unwrap().is_none());
}

#[tokio::test]
async fn get_returns_stored_values() {
  let s = store().await;
  s.add(lagavulin()).await.unwrap();

  let fetched = s.get(id("w-1")).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Lagavulin");
  assert_eq!(fetched.country, "Scotland");
  assert_eq!(fetched.age, "16");
  assert!(fetched.is_owned);
}

#[tokio::test]
async fn add_duplicate_id_fails() {
  let s = store().await;
  s.add(lagavulin()).await.unwrap();

  let err = s.add(whiskey("w-1", "Impostor", "Nowhere", "1")).await.unwrap_err();
  assert!(matches!(err.root(), Error::DuplicateId(dup) if dup.as_str() == "w-1"));

  let kept = s.get(id("w-1")).await.unwrap().unwrap();
  assert_eq!(kept.name, "Lagavulin");
}

// ─── Put ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn put_replaces_all_fields_and_keeps_id() {
  let s = store().await;
  let first = s.add(lagavulin()).await.unwrap();

  let replacement =
    Whiskey { age: "18".into(), is_owned: false, ..whiskey("w-1", "Lagavulin", "Islay", "") };
  let stored = s.put(replacement).await.unwrap();
  assert!(stored.last_edit >= first.last_edit);

  let all = s.list(&ListQuery::All).await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].id.as_str(), "w-1");
  assert_eq!(all[0].country, "Islay");
  assert_eq!(all[0].age, "18");
  assert!(!all[0].is_owned);
}

#[tokio::test]
async fn put_inserts_when_absent() {
  let s = store().await;
  s.put(lagavulin()).await.unwrap();
  assert_eq!(s.count().await.unwrap(), 1);
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_removes_record() {
  let s = store().await;
  s.add(lagavulin()).await.unwrap();

  s.delete(id("w-1")).await.unwrap();
  assert!(s.get(id("w-1")).await.unwrap().is_none());
  assert!(s.list(&ListQuery::All).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_missing_is_a_noop() {
  let s = store().await;
  s.add(lagavulin()).await.unwrap();

  s.delete(id("ghost")).await.unwrap();
  assert_eq!(s.count().await.unwrap(), 1);

  let outcomes = s.commit(vec![WriteOp::Delete(id("ghost"))]).await.unwrap();
  assert_eq!(outcomes, vec![WriteOutcome::Deleted { id: id("ghost"), existed: false }]);
}

// ─── Transactions ────────────────────────────────────────────────────────────

#[tokio::test]
async fn failed_op_rolls_back_whole_batch() {
  let s = store().await;
  s.add(lagavulin()).await.unwrap();

  let err = s
    .commit(vec![
      WriteOp::Add(whiskey("x", "Ardbeg", "Scotland", "10")),
      WriteOp::Delete(id("w-1")),
      WriteOp::Add(whiskey("x", "Ardbeg again", "Scotland", "10")),
    ])
    .await
    .unwrap_err();

  match &err {
    Error::TransactionAborted { index, op, source } => {
      assert_eq!(*index, 2);
      assert_eq!(*op, "add");
      assert!(matches!(**source, Error::DuplicateId(_)));
    }
    other => panic!("expected aborted transaction, got {other:?}"),
  }

  // Nothing from the batch took effect.
  let all = s.list(&ListQuery::All).await.unwrap();
  assert_eq!(names(&all), ["Lagavulin"]);
}

#[tokio::test]
async fn commit_reports_outcome_per_op() {
  let s = store().await;
  s.add(lagavulin()).await.unwrap();

  let outcomes = s
    .commit(vec![
      WriteOp::Add(whiskey("a", "Talisker", "Scotland", "10")),
      WriteOp::Put(whiskey("w-1", "Lagavulin", "Scotland", "18")),
      WriteOp::Delete(id("w-1")),
    ])
    .await
    .unwrap();

  assert_eq!(outcomes.len(), 3);
  assert!(matches!(&outcomes[0], WriteOutcome::Added(w) if w.last_edit.is_some()));
  assert!(matches!(&outcomes[1], WriteOutcome::Put(w) if w.age == "18"));
  assert!(matches!(&outcomes[2], WriteOutcome::Deleted { existed: true, .. }));
  assert_eq!(s.count().await.unwrap(), 1);
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_all_is_in_primary_key_order() {
  let s = store().await;
  shelf(&s).await;

  let all = s.list(&ListQuery::All).await.unwrap();
  let ids: Vec<&str> = all.iter().map(|w| w.id.as_str()).collect();
  assert_eq!(ids, ["a", "b", "c", "d", "e"]);
}

#[tokio::test]
async fn min_age_filter_returns_matches_in_age_order() {
  let s = store().await;
  shelf(&s).await;

  let old = s.list(&ListQuery::min_age(14)).await.unwrap();
  assert_eq!(names(&old), ["Oban", "Highland Park"]);
}

#[tokio::test]
async fn age_range_compares_numerically() {
  let s = store().await;
  shelf(&s).await;
  s.add(whiskey("f", "Glenfarclas", "Scotland", "105")).await.unwrap();

  let mid = s.list(&ListQuery::ByAge(KeyRange::between(10, 14))).await.unwrap();
  assert_eq!(names(&mid), ["Talisker", "Redbreast", "Oban"]);

  let old = s.list(&ListQuery::ByAge(KeyRange::greater_than(18))).await.unwrap();
  assert_eq!(names(&old), ["Glenfarclas"]);
}

#[tokio::test]
async fn country_and_name_ranges() {
  let s = store().await;
  shelf(&s).await;

  let scotch = s.list(&ListQuery::ByCountry(KeyRange::only("Scotland".into()))).await.unwrap();
  assert_eq!(scotch.len(), 3);
  assert!(scotch.iter().all(|w| w.country == "Scotland"));

  let early = s.list(&ListQuery::ByName(KeyRange::less_than("O".into()))).await.unwrap();
  assert_eq!(names(&early), ["Highland Park", "Kavalan"]);
}

#[tokio::test]
async fn inverted_range_is_empty() {
  let s = store().await;
  shelf(&s).await;
  let none = s.list(&ListQuery::ByAge(KeyRange::between(18, 10))).await.unwrap();
  assert!(none.is_empty());
}

#[tokio::test]
async fn last_edit_range_selects_recent_writes() {
  let s = store().await;
  shelf(&s).await;

  let since = Utc::now() - Duration::minutes(1);
  let recent = s
    .list(&ListQuery::ByLastEdit(KeyRange::at_least(since)))
    .await
    .unwrap();
  assert_eq!(recent.len(), 5);

  let future = s
    .list(&ListQuery::ByLastEdit(KeyRange::at_least(Utc::now() + Duration::hours(1))))
    .await
    .unwrap();
  assert!(future.is_empty());
}

// ─── Scenario ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_update_delete_scenario() {
  let s = store().await;
  let mut list = ListRenderer::default();

  s.add(lagavulin()).await.unwrap();
  list.render(&s.list(&ListQuery::All).await.unwrap());
  assert_eq!(list.lines(), ["Lagavulin - Scotland - 16"]);

  s.put(Whiskey { age: "18".into(), ..lagavulin() }).await.unwrap();
  list.render(&s.list(&ListQuery::All).await.unwrap());
  assert_eq!(list.lines(), ["Lagavulin - Scotland - 18"]);

  s.delete(id("w-1")).await.unwrap();
  list.render(&s.list(&ListQuery::All).await.unwrap());
  assert!(list.lines().is_empty());
}

// ─── Seeding ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn seed_only_fills_an_empty_store() {
  let s = store().await;
  let ids = SequentialIds::new("seed");
  let drafts = seed::default_drafts();

  let inserted = seed::seed_if_empty(&s, &drafts, &ids).await.unwrap();
  assert_eq!(inserted, drafts.len());
  assert_eq!(s.count().await.unwrap(), drafts.len());

  let again = seed::seed_if_empty(&s, &drafts, &ids).await.unwrap();
  assert_eq!(again, 0);
  assert_eq!(s.count().await.unwrap(), drafts.len());
}

#[tokio::test]
async fn seed_skips_store_with_records() {
  let s = store().await;
  s.add(lagavulin()).await.unwrap();

  let inserted = seed::seed_if_empty(&s, &seed::default_drafts(), &SequentialIds::new("s"))
    .await
    .unwrap();
  assert_eq!(inserted, 0);
  assert_eq!(s.count().await.unwrap(), 1);
}

// ─── Schema versions ─────────────────────────────────────────────────────────

#[tokio::test]
async fn v1_has_no_indexes_or_timestamps() {
  let s = SqliteStore::open_with(StoreOptions::in_memory().schema_version(1))
    .await
    .unwrap();
  assert_eq!(s.schema_version(), 1);

  let added = s.add(lagavulin()).await.unwrap();
  assert_eq!(added.last_edit, None);
  assert_eq!(s.get(id("w-1")).await.unwrap().unwrap().last_edit, None);

  for index in IndexField::iter() {
    let query = match index {
      IndexField::Name => ListQuery::ByName(KeyRange::unbounded()),
      IndexField::Country => ListQuery::ByCountry(KeyRange::unbounded()),
      IndexField::Age => ListQuery::ByAge(KeyRange::unbounded()),
      IndexField::LastEdit => ListQuery::ByLastEdit(KeyRange::unbounded()),
    };
    let err = s.list(&query).await.unwrap_err();
    assert!(matches!(err, Error::IndexUnavailable { index: i, schema_version: 1 } if i == index));
  }
}

#[tokio::test]
async fn unknown_schema_version_is_rejected() {
  for version in [0, LATEST_VERSION + 1] {
    let err = SqliteStore::open_with(StoreOptions::in_memory().schema_version(version))
      .await
      .err()
      .expect("open should fail");
    assert!(matches!(err, Error::UnknownSchemaVersion(v) if v == version));
  }
}

async fn v1_file_with_records(path: &std::path::Path) {
  let s = SqliteStore::open_with(StoreOptions::file(path).schema_version(1))
    .await
    .unwrap();
  s.add(lagavulin()).await.unwrap();
  s.add(whiskey("w-2", "Kavalan", "Taiwan", "NAS")).await.unwrap();
  s.close().await.unwrap();
}

#[tokio::test]
async fn preserving_upgrade_keeps_records() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("cellar.db");
  v1_file_with_records(&path).await;

  let s = SqliteStore::open_with(
    StoreOptions::file(&path).migration_policy(MigrationPolicy::Preserve),
  )
  .await
  .unwrap();
  assert_eq!(s.schema_version(), LATEST_VERSION);

  let all = s.list(&ListQuery::All).await.unwrap();
  assert_eq!(names(&all), ["Lagavulin", "Kavalan"]);
  assert!(all.iter().all(|w| w.last_edit.is_none()));

  // The age index was back-filled from the v1 text.
  let aged = s.list(&ListQuery::min_age(1)).await.unwrap();
  assert_eq!(names(&aged), ["Lagavulin"]);
}

#[tokio::test]
async fn drop_and_recreate_upgrade_discards_records() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("cellar.db");
  v1_file_with_records(&path).await;

  let s = SqliteStore::open_with(
    StoreOptions::file(&path).migration_policy(MigrationPolicy::DropAndRecreate),
  )
  .await
  .unwrap();

  assert_eq!(s.count().await.unwrap(), 0);
  // The recreated collection has the v2 indexes.
  s.add(lagavulin()).await.unwrap();
  assert_eq!(s.list(&ListQuery::min_age(16)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn reopening_at_same_version_keeps_records() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("cellar.db");

  let s = SqliteStore::open(&path).await.unwrap();
  s.add(lagavulin()).await.unwrap();
  s.close().await.unwrap();

  let s = SqliteStore::open_with(
    StoreOptions::file(&path).migration_policy(MigrationPolicy::DropAndRecreate),
  )
  .await
  .unwrap();
  assert_eq!(s.count().await.unwrap(), 1);
}

#[tokio::test]
async fn downgrade_is_rejected() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("cellar.db");
  SqliteStore::open(&path).await.unwrap().close().await.unwrap();

  let err = SqliteStore::open_with(StoreOptions::file(&path).schema_version(1))
    .await
    .err()
    .expect("downgrade should fail");
  assert!(matches!(
    err,
    Error::UnsupportedSchemaVersion { db_version: 2, requested: 1 }
  ));
}

#[tokio::test]
async fn generated_ids_round_trip_through_the_store() {
  let s = store().await;
  let ids = cellar_core::id::TimeOrderedIds;

  let first = s.add(lagavulin().draft().into_whiskey(ids.next_id())).await.unwrap();
  let second = s.add(lagavulin().draft().into_whiskey(ids.next_id())).await.unwrap();
  assert_ne!(first.id, second.id);

  // v7 ids sort by creation time, so primary-key order is insertion order.
  let all = s.list(&ListQuery::All).await.unwrap();
  assert_eq!(all[0].id, first.id);
  assert_eq!(all[1].id, second.id);
}
