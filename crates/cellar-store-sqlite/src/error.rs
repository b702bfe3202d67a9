//! Error type for `cellar-store-sqlite`.

use cellar_core::{store::IndexField, whiskey::WhiskeyId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] cellar_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A statement inside a write transaction failed.
  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("whiskey {0} already exists")]
  DuplicateId(WhiskeyId),

  #[error("index {index} does not exist at schema version {schema_version}")]
  IndexUnavailable { index: IndexField, schema_version: u32 },

  #[error("unknown schema version {0}")]
  UnknownSchemaVersion(u32),

  #[error("database is at schema version {db_version}, cannot open at {requested}")]
  UnsupportedSchemaVersion { db_version: u32, requested: u32 },

  /// One op of a batch failed; nothing in the batch was written.
  #[error("transaction aborted at op {index} ({op}): {source}")]
  TransactionAborted {
    index:  usize,
    op:     &'static str,
    #[source]
    source: Box<Error>,
  },
}

impl Error {
  /// The error that caused a transaction to abort, or `self` for any other
  /// error.
  pub fn root(&self) -> &Error {
    match self {
      Error::TransactionAborted { source, .. } => source.root(),
      other => other,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
