//! Command line interface for syncing lesson files into Anki.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use deckmate::AnkiClient;
use deckmate_engine::{DeckConfig, MoveEngine, SyncEngine, SyncOptions, load_lessons};
use tracing::error;

/// Sync hand-authored lesson files into an Anki deck via AnkiConnect.
#[derive(Parser, Debug)]
#[command(name = "deckmate")]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding config.json and lesson_NN.json files
    #[arg(long, default_value = "content")]
    content_dir: PathBuf,

    /// AnkiConnect host address
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// AnkiConnect port
    #[arg(long, default_value_t = 8765)]
    port: u16,

    /// Enable verbose logging (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconcile the Anki deck against the lesson files
    Sync {
        /// Report what would change without touching Anki
        #[arg(long)]
        dry_run: bool,
    },
    /// List lessons and cards from the content directory
    List {
        /// Only show this lesson
        #[arg(long)]
        lesson: Option<u32>,
    },
    /// Move a card to another lesson, renumbering its uid
    Move {
        /// Uid of the card to move
        uid: String,
        /// Destination lesson number
        lesson: u32,
        /// Report what would change without touching files or Anki
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> deckmate_engine::Result<ExitCode> {
    let config = DeckConfig::load(&args.content_dir)?;
    let lessons = load_lessons(&args.content_dir, &config)?;
    let client = AnkiClient::builder()
        .url(format!("http://{}:{}", args.host, args.port))
        .build();

    match args.command {
        Command::Sync { dry_run } => {
            let engine = SyncEngine::new(&client, &config, &args.content_dir);
            let report = engine.sync(&lessons, SyncOptions { dry_run }).await?;

            let verb = if report.dry_run { "would " } else { "" };
            println!(
                "{}create {}, {}update {}, {}delete {}, unchanged {}",
                verb, report.created, verb, report.updated, verb, report.deleted, report.unchanged
            );
            for missing in &report.missing_assets {
                println!("missing asset: {} (referenced by {})", missing.filename, missing.uid);
            }
            for failure in &report.failures {
                println!("{} {} failed: {}", failure.operation, failure.uid, failure.error);
            }
            if report.failures.is_empty() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Command::List { lesson } => {
            for l in lessons.iter().filter(|l| lesson.is_none_or(|id| id == l.id)) {
                println!("{} ({} cards)", l.title, l.cards.len());
                for card in &l.cards {
                    println!("  {}  {}", card.uid, first_line(&card.front));
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Move { uid, lesson, dry_run } => {
            let engine = MoveEngine::new(&client, &config);
            let outcome = engine
                .move_card(&args.content_dir, &uid, lesson, dry_run)
                .await?;

            if outcome.dry_run {
                println!(
                    "would move {} -> {} ({})",
                    outcome.old_uid, outcome.new_uid, outcome.deck
                );
            } else {
                println!(
                    "moved {} -> {} ({})",
                    outcome.old_uid, outcome.new_uid, outcome.deck
                );
                if !outcome.remote_updated {
                    println!("note: Anki was not updated, run sync to reconcile");
                }
                if let Some(e) = &outcome.remote_error {
                    println!("note: Anki update failed ({}), run sync to reconcile", e);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// First line of a card front, truncated for display.
fn first_line(front: &str) -> String {
    let line = front.lines().next().unwrap_or_default();
    if line.chars().count() > 70 {
        let truncated: String = line.chars().take(67).collect();
        format!("{}...", truncated)
    } else {
        line.to_string()
    }
}
