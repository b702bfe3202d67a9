//! `cellar` — terminal UI for a whiskey inventory.
//!
//! # Usage
//!
//! ```
//! cellar --store ~/whiskey.db
//! cellar --config ~/.config/cellar/cellar.toml --min-age 12
//! ```

mod app;
mod config;
mod ui;

use std::{fs::File, io, sync::Mutex, time::Duration};

use anyhow::{Context, Result};
use app::App;
use cellar_core::{
  id::TimeOrderedIds,
  seed::{default_drafts, drafts_from_json, seed_if_empty},
  store::ListQuery,
};
use cellar_store_sqlite::{SqliteStore, StoreOptions};
use clap::Parser;
use crate::config::{Args, Settings};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing_subscriber::EnvFilter;

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let settings = Settings::load(&args)?;

  // The terminal belongs to the UI, so logs go to a file.
  let log = File::create(&settings.log_file)
    .with_context(|| format!("creating log file {}", settings.log_file.display()))?;
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(Mutex::new(log))
    .with_ansi(false)
    .init();

  let options = StoreOptions::file(&settings.store_path)
    .migration_policy(settings.migration_policy);
  let store = match SqliteStore::open_with(options).await {
    Ok(store) => store,
    Err(e) => {
      tracing::error!(path = %settings.store_path.display(), "failed to open store: {e}");
      return Err(e)
        .with_context(|| format!("opening store {}", settings.store_path.display()));
    }
  };

  if settings.seed {
    let drafts = match &settings.seed_file {
      Some(path) => {
        let raw = std::fs::read_to_string(path)
          .with_context(|| format!("reading seed file {}", path.display()))?;
        drafts_from_json(&raw).context("parsing seed file")?
      }
      None => default_drafts(),
    };
    let seeded = seed_if_empty(&store, &drafts, &TimeOrderedIds).await?;
    if seeded > 0 {
      tracing::info!(count = seeded, "seeded empty store");
    }
  }

  let query = settings.min_age.map_or(ListQuery::All, ListQuery::min_age);
  let mut app = App::new(store, Box::new(TimeOrderedIds), query);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  app.refresh().await;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  app.into_store().close().await.context("closing store")?;
  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App<SqliteStore>,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event {
      if !app.handle_key(key).await {
        break;
      }
    }
  }

  Ok(())
}
