//! `rota`: import schedule inputs, execute runs, and serve the JSON API.
//!
//! Reads `rota.toml` (or the path given with `--config`) and `ROTA_*`
//! environment variables, then opens the SQLite store named by
//! `store_path`.
//!
//! ```text
//! rota import decision-rows table.json
//! rota run --from 2024-05-01 --to 2024-05-31 --audit-out audit.tsv
//! rota serve
//! ```

mod settings;

use std::{
  io::Write as _,
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use rota_api::{ApiState, api_router};
use rota_core::{
  resolver::AuditRow,
  run::{RunRequest, execute_run},
  store::{LedgerQuery, RotaStore},
};
use rota_store_sqlite::SqliteStore;
use serde::de::DeserializeOwned;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use settings::Settings;

#[derive(Parser)]
#[command(author, version, about = "Rota schedule resolution and entitlement ledger")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, global = true, default_value = "rota.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API.
  Serve,

  /// Resolve every employee over an inclusive date range.
  Run {
    #[arg(long)]
    from:      String,
    #[arg(long)]
    to:        String,
    /// Plan only; leave the ledger and run history untouched.
    #[arg(long)]
    dry_run:   bool,
    /// Write the audit table as tab-separated values to this path.
    #[arg(long)]
    audit_out: Option<PathBuf>,
  },

  /// Replace one input table with the records in a JSON array file.
  Import { table: Table, file: PathBuf },

  /// Print ledger entries as JSON.
  Ledger {
    #[arg(long)]
    employee: Option<String>,
    /// Include Inactive entries.
    #[arg(long)]
    all:      bool,
  },

  /// Print recorded runs as JSON, newest first.
  Runs {
    #[arg(long)]
    limit: Option<usize>,
  },

  /// Print a recorded run's audit table as tab-separated values.
  Audit { run_id: Uuid },
}

#[derive(Clone, Copy, ValueEnum)]
enum Table {
  Employees,
  Rules,
  DecisionRows,
  Holidays,
  Leaves,
  ShiftStatuses,
  Ledger,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;

  if let Some(parent) = settings.store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.store_path))?;

  match cli.command {
    Command::Serve => serve(store, settings).await,
    Command::Run { from, to, dry_run, audit_out } => {
      let request = RunRequest { from, to, workspace: settings.workspace.clone(), dry_run };
      let outcome = execute_run(&store, &settings.engine, &request)
        .await
        .context("run failed")?;
      if let Some(path) = audit_out {
        let file = std::fs::File::create(&path)
          .with_context(|| format!("failed to create {path:?}"))?;
        write_audit(file, &outcome.audit)
          .with_context(|| format!("failed to write {path:?}"))?;
      }
      print_json(&outcome.summary)
    }
    Command::Import { table, file } => import(&store, table, &file).await,
    Command::Ledger { employee, all } => {
      let entries = store
        .list_ledger(LedgerQuery { employee_id: employee, include_inactive: all })
        .await
        .context("failed to list ledger")?;
      print_json(&entries)
    }
    Command::Runs { limit } => {
      let runs = store.list_runs(limit).await.context("failed to list runs")?;
      print_json(&runs)
    }
    Command::Audit { run_id } => {
      let rows = store
        .get_audit(run_id)
        .await
        .with_context(|| format!("failed to read audit for run {run_id}"))?;
      write_audit(std::io::stdout().lock(), &rows).context("failed to write audit")
    }
  }
}

async fn serve(store: SqliteStore, settings: Settings) -> anyhow::Result<()> {
  let state = ApiState {
    store:     Arc::new(store),
    engine:    Arc::new(settings.engine),
    workspace: Arc::from(settings.workspace.as_str()),
  };
  let app = axum::Router::new().nest("/api", api_router(state));
  let address = format!("{}:{}", settings.host, settings.port);

  tracing::info!("Listening on http://{address}/api");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;
  Ok(())
}

fn read_records<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
  let text =
    std::fs::read_to_string(path).with_context(|| format!("failed to read {path:?}"))?;
  serde_json::from_str(&text).with_context(|| format!("failed to parse {path:?}"))
}

async fn import(store: &SqliteStore, table: Table, path: &Path) -> anyhow::Result<()> {
  let count = match table {
    Table::Employees => store.import_employees(read_records(path)?).await,
    Table::Rules => store.import_rules(read_records(path)?).await,
    Table::DecisionRows => store.import_decision_rows(read_records(path)?).await,
    Table::Holidays => store.import_holidays(read_records(path)?).await,
    Table::Leaves => store.import_leaves(read_records(path)?).await,
    Table::ShiftStatuses => store.import_shift_statuses(read_records(path)?).await,
    Table::Ledger => store.import_ledger(read_records(path)?).await,
  }
  .with_context(|| format!("failed to import {path:?}"))?;

  println!("{count}");
  Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let text = serde_json::to_string_pretty(value).context("failed to serialise output")?;
  println!("{text}");
  Ok(())
}

/// Header line then one line per row; tabs and newlines inside fields are
/// replaced by spaces.
fn write_audit(mut out: impl std::io::Write, rows: &[AuditRow]) -> anyhow::Result<()> {
  writeln!(out, "{}", AuditRow::HEADER.join("\t"))?;
  for row in rows {
    let fields = row.fields().map(|f| f.replace(['\t', '\n'], " "));
    writeln!(out, "{}", fields.join("\t"))?;
  }
  out.flush()?;
  Ok(())
}
