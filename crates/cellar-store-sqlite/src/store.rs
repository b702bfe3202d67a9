//! [`SqliteStore`] — the SQLite implementation of [`WhiskeyStore`].

use std::path::{Path, PathBuf};

use cellar_core::{
  store::{ListQuery, MigrationPolicy, WhiskeyStore, WriteOp, WriteOutcome},
  whiskey::{Whiskey, WhiskeyId},
};
use chrono::{DateTime, SubsecRound as _, Utc};
use rusqlite::{ErrorCode, OptionalExtension as _, Transaction};

use crate::{
  encode::{index_bounds, range_conditions, select_columns, RawWhiskey, RawWrite},
  schema::{self, LATEST_VERSION, PRAGMAS},
  Error, Result,
};

// ─── Options ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
  File(PathBuf),
  Memory,
}

/// How to open a [`SqliteStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
  pub location:         Location,
  /// Schema version to open at; upgrades run when it exceeds the stored one.
  pub schema_version:   u32,
  pub migration_policy: MigrationPolicy,
}

impl StoreOptions {
  pub fn file(path: impl AsRef<Path>) -> Self {
    Self {
      location:         Location::File(path.as_ref().to_path_buf()),
      schema_version:   LATEST_VERSION,
      migration_policy: MigrationPolicy::default(),
    }
  }

  pub fn in_memory() -> Self {
    Self { location: Location::Memory, ..Self::file("") }
  }

  pub fn schema_version(mut self, version: u32) -> Self {
    self.schema_version = version;
    self
  }

  pub fn migration_policy(mut self, policy: MigrationPolicy) -> Self {
    self.migration_policy = policy;
    self
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A whiskey store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All clones
/// share one connection; [`close`](Self::close) shuts it for every clone.
#[derive(Clone)]
pub struct SqliteStore {
  conn:           tokio_rusqlite::Connection,
  schema_version: u32,
}

/// A failed op inside a write transaction.
struct OpFailure {
  index: usize,
  error: Error,
}

impl SqliteStore {
  /// Open (or create) a store at `path` at the latest schema version,
  /// preserving existing records across upgrades.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::open_with(StoreOptions::file(path)).await
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    Self::open_with(StoreOptions::in_memory()).await
  }

  pub async fn open_with(options: StoreOptions) -> Result<Self> {
    let requested = options.schema_version;
    if requested == 0 || requested > LATEST_VERSION {
      return Err(Error::UnknownSchemaVersion(requested));
    }

    let conn = match &options.location {
      Location::File(path) => tokio_rusqlite::Connection::open(path).await?,
      Location::Memory => tokio_rusqlite::Connection::open_in_memory().await?,
    };

    let stored = conn
      .call(|conn| {
        conn.execute_batch(PRAGMAS)?;
        Ok(schema::current_version(conn)?)
      })
      .await?;

    if stored > requested {
      return Err(Error::UnsupportedSchemaVersion { db_version: stored, requested });
    }

    if stored < requested {
      let policy = options.migration_policy;
      let upgrade = conn
        .call(move |conn| Ok(schema::upgrade(conn, stored, requested, policy)?))
        .await?;

      if upgrade.discarded > 0 {
        tracing::warn!(
          from = upgrade.from,
          to = upgrade.to,
          discarded = upgrade.discarded,
          "schema upgrade dropped and recreated the whiskey collection",
        );
      } else {
        tracing::info!(from = upgrade.from, to = upgrade.to, %policy, "schema upgraded");
      }
    }

    tracing::info!(
      location = ?options.location,
      schema_version = requested,
      "whiskey store opened",
    );
    Ok(Self { conn, schema_version: requested })
  }

  /// Close the connection, waiting for queued calls to finish.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    tracing::debug!("whiskey store closed");
    Ok(())
  }

  pub fn schema_version(&self) -> u32 { self.schema_version }

  /// Run `ops` in one transaction. Returns the rows changed per op and the
  /// `last_edit` stamp given to every add and put.
  async fn write(&self, ops: &[WriteOp]) -> Result<(Vec<usize>, Option<DateTime<Utc>>)> {
    let has_v2_columns = schema::has_indexes(self.schema_version);
    // Stored text keeps microseconds; stamp at that precision so the
    // returned record matches what reads give back.
    let stamp = has_v2_columns.then(|| Utc::now().trunc_subsecs(6));
    let writes: Vec<RawWrite> = ops.iter().map(|op| RawWrite::encode(op, stamp)).collect();

    let applied: std::result::Result<Vec<usize>, OpFailure> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut changed = Vec::with_capacity(writes.len());

        for (index, write) in writes.iter().enumerate() {
          match apply_write(&tx, write, has_v2_columns) {
            Ok(n) => {
              tracing::debug!(index, op = write.kind, id = %write.id, "write applied");
              changed.push(n);
            }
            Err(error) => {
              tracing::warn!(index, op = write.kind, id = %write.id, %error, "write failed");
              // Dropping `tx` rolls the whole batch back.
              return Ok(Err(OpFailure { index, error }));
            }
          }
        }

        tx.commit()?;
        Ok(Ok(changed))
      })
      .await?;

    match applied {
      Ok(changed) => {
        tracing::debug!(ops = ops.len(), "transaction completed");
        Ok((changed, stamp))
      }
      Err(OpFailure { index, error }) => {
        let op = ops[index].kind();
        tracing::error!(ops = ops.len(), index, op, %error, "transaction failed");
        Err(Error::TransactionAborted { index, op, source: Box::new(error) })
      }
    }
  }
}

/// Run one write inside `tx`. Returns the number of rows changed.
fn apply_write(tx: &Transaction<'_>, write: &RawWrite, has_v2_columns: bool) -> Result<usize> {
  let Some(row) = &write.row else {
    return Ok(tx.execute("DELETE FROM whiskey_store WHERE id = ?1", rusqlite::params![write.id])?);
  };

  let verb = if write.insert { "INSERT" } else { "INSERT OR REPLACE" };
  let result = if has_v2_columns {
    tx.execute(
      &format!(
        "{verb} INTO whiskey_store (id, name, country, age, is_owned, last_edit, age_key)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
      ),
      rusqlite::params![
        write.id,
        row.name,
        row.country,
        row.age,
        row.is_owned,
        row.last_edit,
        row.age_key,
      ],
    )
  } else {
    tx.execute(
      &format!(
        "{verb} INTO whiskey_store (id, name, country, age, is_owned)
         VALUES (?1, ?2, ?3, ?4, ?5)"
      ),
      rusqlite::params![write.id, row.name, row.country, row.age, row.is_owned],
    )
  };

  match result {
    Ok(n) => Ok(n),
    Err(rusqlite::Error::SqliteFailure(e, _))
      if write.insert && e.code == ErrorCode::ConstraintViolation =>
    {
      Err(Error::DuplicateId(WhiskeyId::parse(write.id.clone())?))
    }
    Err(e) => Err(e.into()),
  }
}

// ─── WhiskeyStore impl ───────────────────────────────────────────────────────

impl WhiskeyStore for SqliteStore {
  type Error = Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn commit(&self, ops: Vec<WriteOp>) -> Result<Vec<WriteOutcome>> {
    let (changed, stamp) = self.write(&ops).await?;

    let outcomes = ops
      .into_iter()
      .zip(changed)
      .map(|(op, n)| match op {
        WriteOp::Add(w) => WriteOutcome::Added(Whiskey { last_edit: stamp, ..w }),
        WriteOp::Put(w) => WriteOutcome::Put(Whiskey { last_edit: stamp, ..w }),
        WriteOp::Delete(id) => WriteOutcome::Deleted { id, existed: n > 0 },
      })
      .collect();

    Ok(outcomes)
  }

  async fn add(&self, whiskey: Whiskey) -> Result<Whiskey> {
    let (_, stamp) = self.write(&[WriteOp::Add(whiskey.clone())]).await?;
    Ok(Whiskey { last_edit: stamp, ..whiskey })
  }

  async fn put(&self, whiskey: Whiskey) -> Result<Whiskey> {
    let (_, stamp) = self.write(&[WriteOp::Put(whiskey.clone())]).await?;
    Ok(Whiskey { last_edit: stamp, ..whiskey })
  }

  async fn delete(&self, id: WhiskeyId) -> Result<()> {
    self.write(&[WriteOp::Delete(id)]).await?;
    Ok(())
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get(&self, id: WhiskeyId) -> Result<Option<Whiskey>> {
    let sql = format!(
      "SELECT {} FROM whiskey_store WHERE id = ?1",
      select_columns(schema::has_indexes(self.schema_version)),
    );
    let id_str = id.into_string();

    let raw: Option<RawWhiskey> = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&sql, rusqlite::params![id_str], RawWhiskey::from_row).optional()?)
      })
      .await?;

    raw.map(RawWhiskey::into_whiskey).transpose()
  }

  async fn list(&self, query: &ListQuery) -> Result<Vec<Whiskey>> {
    let has_indexes = schema::has_indexes(self.schema_version);

    if let Some(index) = query.index() {
      if !has_indexes {
        return Err(Error::IndexUnavailable { index, schema_version: self.schema_version });
      }
    }

    let mut params = Vec::new();
    let (where_clause, order) = match index_bounds(query) {
      None => (String::new(), "id".to_owned()),
      Some((column, range)) => {
        let conds = range_conditions(column, range, &mut params);
        (format!("WHERE {}", conds.join(" AND ")), format!("{column}, id"))
      }
    };

    let sql = format!(
      "SELECT {} FROM whiskey_store {where_clause} ORDER BY {order}",
      select_columns(has_indexes),
    );

    let raws: Vec<RawWhiskey> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawWhiskey::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawWhiskey::into_whiskey).collect()
  }

  async fn count(&self) -> Result<usize> {
    let n: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM whiskey_store", [], |row| row.get(0))?))
      .await?;
    Ok(n as usize)
  }
}
