/**
 * S3 Tracker - Command-Line Entry Point
 *
 * Opens the local store, restores the offline queue, drains it when online,
 * then runs one command against the sync core and prints the notifications
 * it produced.
 */
use clap::{Parser, Subcommand};
use s3tracker::shared::SyncEvent;
use s3tracker::tracker::progress::ProgressSummary;
use s3tracker::tracker::{
    ApplyOutcome, Config, CoordinatorOptions, HttpRowClient, NoteBook, NoteKey, ReminderSettings, SqliteStore,
    SyncCoordinator,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Debug, Parser)]
#[command(name = "s3tracker", version, about = "Offline-tolerant study tracker")]
struct Cli {
    /// Treat the row store as unreachable; writes are queued
    #[arg(long, global = true)]
    offline: bool,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch every sheet
    Fetch,
    /// Set an item's Done flag
    Toggle {
        sheet: String,
        row: usize,
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
    /// Add a topic under a module
    Add { sheet: String, module: u32, topic: String },
    /// Delete a topic row
    Delete { sheet: String, row: usize },
    /// Drain the offline queue
    Sync,
    /// Show queued mutations
    Pending,
    /// Attach a note to a row
    Note { sheet: String, row: usize, text: String },
    /// Show progress numbers
    Stats,
    /// Switch hourly reminders on or off
    Reminders,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::new(),
    };

    let store = Arc::new(SqliteStore::open(&config.database_path()).await?);
    let remote = Arc::new(HttpRowClient::new(&config)?);
    let coordinator =
        SyncCoordinator::new(remote, store.clone(), CoordinatorOptions::from_config(&config)).await;
    let mut events = coordinator.subscribe();

    if cli.offline {
        coordinator.set_online(false).await?;
    } else if coordinator.pending_count().await > 0 {
        coordinator.sync_pending().await?;
    }

    let result = run(&cli.command, &coordinator, store.clone(), cli.offline).await;
    print_notifications(&mut events);
    store.close().await;
    result
}

async fn run(
    command: &Command,
    coordinator: &SyncCoordinator,
    store: Arc<SqliteStore>,
    offline: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Fetch => {
            coordinator.refresh().await?;
            for (name, items) in coordinator.snapshot().sheets() {
                let done = items.iter().filter(|item| item.done).count();
                println!("{:<24} {:>4}/{:<4}", name, done, items.len());
            }
        }
        Command::Toggle { sheet, row, value } => {
            load_rows(coordinator, offline).await;
            report(coordinator.toggle_item(sheet, *row, *value).await);
        }
        Command::Add { sheet, module, topic } => {
            report(coordinator.add_item(sheet, *module, topic).await);
        }
        Command::Delete { sheet, row } => {
            load_rows(coordinator, offline).await;
            report(coordinator.delete_item(sheet, *row).await);
        }
        Command::Sync => {
            let report = coordinator.sync_pending().await?;
            println!(
                "written {}, discarded {}, remaining {}",
                report.drain.written,
                report.drain.discarded.len(),
                report.drain.remaining
            );
        }
        Command::Pending => {
            println!("{}", serde_json::to_string_pretty(&coordinator.pending().await)?);
        }
        Command::Note { sheet, row, text } => {
            let notes = NoteBook::load(store).await.with_events(coordinator.event_sender());
            notes.save(&NoteKey::new(sheet.as_str(), *row), text.as_str()).await?;
        }
        Command::Stats => {
            coordinator.refresh().await?;
            let summary = ProgressSummary::from_snapshot(&coordinator.snapshot());
            println!("Completed days:  {}", summary.completed_days);
            println!(
                "Topics:          {}/{} ({}%)",
                summary.completed_topics, summary.total_topics, summary.completion_percent
            );
            println!("{}", serde_json::to_string_pretty(&coordinator.status().await)?);
        }
        Command::Reminders => {
            let reminders = ReminderSettings::load(store).await.with_events(coordinator.event_sender());
            reminders.toggle().await?;
        }
    }
    Ok(())
}

/// Fetch rows so queued mutations carry their row fingerprint
async fn load_rows(coordinator: &SyncCoordinator, offline: bool) {
    if offline {
        return;
    }
    if let Err(e) = coordinator.refresh().await {
        tracing::warn!("could not load rows before writing: {}", e);
    }
}

fn report(outcome: ApplyOutcome) {
    match outcome {
        ApplyOutcome::Written => println!("saved"),
        ApplyOutcome::Queued { pending } => println!("queued ({} pending)", pending),
    }
}

fn print_notifications(events: &mut broadcast::Receiver<SyncEvent>) {
    loop {
        match events.try_recv() {
            Ok(event) => {
                if let Some(notification) = event.notification() {
                    eprintln!("[{:?}] {}", notification.level, notification.message);
                }
            }
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "notifications dropped");
            }
            Err(_) => break,
        }
    }
}
