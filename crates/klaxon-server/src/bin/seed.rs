//! Seed tool: wipe the incident store and refill it with sample data.
//!
//! The data is generated by cycling through fixed tables, so two runs with
//! the same `--count` produce the same rows apart from timestamps.
//!
//! ```
//! cargo run -p klaxon-server --bin seed -- --count 500
//! ```

use std::{fs, path::PathBuf};

use anyhow::Context as _;
use chrono::{Duration, Utc};
use clap::Parser;
use klaxon_core::{
  incident::{IncidentDraft, Severity, Status},
  store::IncidentStore as _,
};
use klaxon_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Seed the Klaxon store with sample data")]
struct Cli {
  /// Path to the SQLite database file.
  #[arg(long, default_value = "data/incidents.db")]
  db_path: PathBuf,

  /// Number of incidents to insert.
  #[arg(long, default_value_t = 200)]
  count: usize,
}

const SERVICES: &[&str] = &[
  "checkout",
  "payments-service",
  "search",
  "auth",
  "notifications",
  "inventory",
  "shipping",
  "analytics",
];

const TITLES: &[&str] = &[
  "DB timeout",
  "Cache miss storm",
  "Queue backlog",
  "Disk usage critical",
  "Latency spike",
  "Connection pool exhausted",
  "Certificate expiry",
  "Memory leak",
];

const OWNERS: &[Option<&str>] = &[
  Some("maya"),
  None,
  Some("jun"),
  Some("priya"),
  None,
  Some("tomas"),
];

const SUMMARIES: &[Option<&str>] = &[
  Some("Spotted by the p99 latency alert."),
  None,
  Some("Customers reported failures at checkout."),
  Some("Started after the 14:00 deploy."),
  None,
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if let Some(parent) = cli.db_path.parent()
    && !parent.as_os_str().is_empty()
  {
    fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  let store = SqliteStore::open(&cli.db_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cli.db_path))?;

  store.wipe().await.context("failed to wipe store")?;
  tracing::info!("Wiped existing incidents");

  let now = Utc::now();
  for i in 0..cli.count {
    let severity = match i % 4 {
      0 => Severity::Sev1,
      1 => Severity::Sev2,
      2 => Severity::Sev3,
      _ => Severity::Sev4,
    };
    let status = match i % 3 {
      0 => Status::Open,
      1 => Status::Mitigated,
      _ => Status::Resolved,
    };

    // Spread creation times over roughly the last 60 days.
    let created = now - Duration::hours(((i * 7) % (60 * 24)) as i64);
    let updated = match status {
      Status::Open => created,
      Status::Mitigated => created + Duration::minutes(45),
      Status::Resolved => created + Duration::hours(6),
    }
    .min(now);

    let service = SERVICES[i % SERVICES.len()];
    let draft = IncidentDraft {
      title:      format!("{} in {}", TITLES[i % TITLES.len()], service),
      service:    service.to_owned(),
      severity,
      status,
      owner:      OWNERS[i % OWNERS.len()].map(str::to_owned),
      summary:    SUMMARIES[i % SUMMARIES.len()].map(str::to_owned),
      created_at: created,
      updated_at: updated,
    };
    store
      .insert(&draft)
      .await
      .context("failed to insert incident")?;
  }

  tracing::info!("Seeded {} incidents into {:?}", cli.count, cli.db_path);
  Ok(())
}
