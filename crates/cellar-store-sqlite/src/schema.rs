//! SQL schema for the Cellar SQLite store, and the upgrade path between
//! versions.
//!
//! The stored version lives in `PRAGMA user_version`; `0` means a fresh
//! database. Raising the requested version runs the upgrade under the
//! caller's [`MigrationPolicy`].

use cellar_core::{store::MigrationPolicy, whiskey::age_key};
use rusqlite::Connection;

/// Newest schema this build knows how to create.
pub const LATEST_VERSION: u32 = 2;

/// Per-connection settings, applied on every open.
pub const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

/// v1: the collection keyed by `id`, no secondary indexes.
const V1_TABLE: &str = "
CREATE TABLE IF NOT EXISTS whiskey_store (
    id        TEXT PRIMARY KEY,
    name      TEXT NOT NULL,
    country   TEXT NOT NULL,
    age       TEXT NOT NULL,     -- free text
    is_owned  INTEGER NOT NULL DEFAULT 0
);
";

/// v2 created from scratch.
const V2_TABLE: &str = "
CREATE TABLE IF NOT EXISTS whiskey_store (
    id        TEXT PRIMARY KEY,
    name      TEXT NOT NULL,
    country   TEXT NOT NULL,
    age       TEXT NOT NULL,
    is_owned  INTEGER NOT NULL DEFAULT 0,
    last_edit TEXT,              -- RFC 3339 UTC, fixed width; store-assigned
    age_key   INTEGER            -- age as an integer, NULL when not numeric
);
";

/// v1 → v2 in place. `age_key` is back-filled separately.
const V2_ALTER: &str = "
ALTER TABLE whiskey_store ADD COLUMN last_edit TEXT;
ALTER TABLE whiskey_store ADD COLUMN age_key   INTEGER;
";

const V2_INDEXES: &str = "
CREATE INDEX IF NOT EXISTS whiskey_name_idx      ON whiskey_store(name);
CREATE INDEX IF NOT EXISTS whiskey_country_idx   ON whiskey_store(country);
CREATE INDEX IF NOT EXISTS whiskey_age_idx       ON whiskey_store(age_key);
CREATE INDEX IF NOT EXISTS whiskey_last_edit_idx ON whiskey_store(last_edit);
";

/// What an upgrade did, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upgrade {
  pub from:      u32,
  pub to:        u32,
  /// Rows discarded by [`MigrationPolicy::DropAndRecreate`].
  pub discarded: usize,
}

pub fn current_version(conn: &Connection) -> rusqlite::Result<u32> {
  conn.query_row("PRAGMA user_version", [], |row| row.get(0))
}

/// Bring the database from `from` to `to` in one transaction.
///
/// Callers validate the versions first: `from < to <= LATEST_VERSION`.
pub fn upgrade(
  conn: &mut Connection,
  from: u32,
  to: u32,
  policy: MigrationPolicy,
) -> rusqlite::Result<Upgrade> {
  let tx = conn.transaction()?;
  let mut discarded = 0;

  if from == 0 {
    create(&tx, to)?;
  } else {
    match policy {
      MigrationPolicy::DropAndRecreate => {
        discarded = tx.query_row("SELECT COUNT(*) FROM whiskey_store", [], |row| {
          row.get::<_, i64>(0)
        })? as usize;
        tx.execute_batch("DROP TABLE IF EXISTS whiskey_store;")?;
        create(&tx, to)?;
      }
      MigrationPolicy::Preserve => {
        for version in from + 1..=to {
          step(&tx, version)?;
        }
      }
    }
  }

  tx.pragma_update(None, "user_version", to)?;
  tx.commit()?;

  Ok(Upgrade { from, to, discarded })
}

/// Create the collection directly at `version`.
fn create(conn: &Connection, version: u32) -> rusqlite::Result<()> {
  match version {
    1 => conn.execute_batch(V1_TABLE),
    _ => {
      conn.execute_batch(V2_TABLE)?;
      conn.execute_batch(V2_INDEXES)
    }
  }
}

/// Upgrade an existing collection from `version - 1` to `version`.
fn step(conn: &Connection, version: u32) -> rusqlite::Result<()> {
  match version {
    2 => {
      conn.execute_batch(V2_ALTER)?;
      backfill_age_key(conn)?;
      conn.execute_batch(V2_INDEXES)
    }
    _ => Ok(()),
  }
}

fn backfill_age_key(conn: &Connection) -> rusqlite::Result<()> {
  let ages: Vec<(String, String)> = {
    let mut stmt = conn.prepare("SELECT id, age FROM whiskey_store")?;
    let rows = stmt
      .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
      .collect::<rusqlite::Result<_>>()?;
    rows
  };

  let mut update = conn.prepare("UPDATE whiskey_store SET age_key = ?1 WHERE id = ?2")?;
  for (id, age) in ages {
    if let Some(key) = age_key(&age) {
      update.execute(rusqlite::params![key, id])?;
    }
  }
  Ok(())
}

/// Whether `version` has a column and index for `last_edit`/`age_key`.
pub fn has_indexes(version: u32) -> bool { version >= 2 }
