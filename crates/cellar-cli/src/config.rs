//! Command-line arguments and layered settings.
//!
//! Precedence, lowest first: built-in defaults, the TOML config file,
//! `CELLAR_*` environment variables, command-line flags.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use cellar_core::store::MigrationPolicy;
use clap::Parser;
use serde::Deserialize;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug, Default)]
#[command(name = "cellar", version, about = "Terminal whiskey inventory")]
pub struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", env = "CELLAR_CONFIG")]
  pub config: Option<PathBuf>,

  /// SQLite database file.
  #[arg(long, value_name = "PATH")]
  pub store: Option<PathBuf>,

  /// Only list whiskeys at least this many years old.
  #[arg(long, value_name = "YEARS")]
  pub min_age: Option<u32>,

  /// What to do with existing records on a schema upgrade
  /// (`preserve` or `drop_and_recreate`).
  #[arg(long, value_name = "POLICY")]
  pub migration_policy: Option<MigrationPolicy>,

  /// Do not seed an empty store.
  #[arg(long)]
  pub no_seed: bool,

  /// Where to write the log.
  #[arg(long, value_name = "PATH")]
  pub log_file: Option<PathBuf>,
}

// ─── Settings ─────────────────────────────────────────────────────────────────

/// Runtime settings, after all layers are merged.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub store_path:       PathBuf,
  pub migration_policy: MigrationPolicy,
  /// Seed an empty store on startup.
  pub seed:             bool,
  /// JSON array of drafts to seed with instead of the built-in list.
  pub seed_file:        Option<PathBuf>,
  pub log_file:         PathBuf,
  pub min_age:          Option<u32>,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      store_path:       PathBuf::from("cellar.db"),
      migration_policy: MigrationPolicy::default(),
      seed:             true,
      seed_file:        None,
      log_file:         PathBuf::from("cellar.log"),
      min_age:          None,
    }
  }
}

impl Settings {
  /// Merge the config file (required only when given explicitly), the
  /// environment and `args`.
  pub fn load(args: &Args) -> anyhow::Result<Self> {
    let file = args.config.clone().unwrap_or_else(|| PathBuf::from("cellar.toml"));

    let layered = config::Config::builder()
      .add_source(config::File::from(file).required(args.config.is_some()))
      .add_source(config::Environment::with_prefix("CELLAR").try_parsing(true))
      .build()
      .context("failed to read config file")?;

    let mut settings: Settings = layered
      .try_deserialize()
      .context("failed to deserialise settings")?;

    settings.apply_args(args);
    settings.store_path = expand_tilde(&settings.store_path);
    settings.log_file = expand_tilde(&settings.log_file);
    settings.seed_file = settings.seed_file.as_deref().map(expand_tilde);
    Ok(settings)
  }

  fn apply_args(&mut self, args: &Args) {
    if let Some(path) = &args.store {
      self.store_path = path.clone();
    }
    if let Some(years) = args.min_age {
      self.min_age = Some(years);
    }
    if let Some(policy) = args.migration_policy {
      self.migration_policy = policy;
    }
    if args.no_seed {
      self.seed = false;
    }
    if let Some(path) = &args.log_file {
      self.log_file = path.clone();
    }
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/") {
    if let Ok(home) = std::env::var("HOME") {
      return PathBuf::from(home).join(rest);
    }
  }
  path.to_path_buf()
}
