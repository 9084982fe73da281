use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use admin::badges::read_badge_file;
use admin::roster::{RosterFile, RosterImporter, RosterValidator};
use admin::{AdminError, Result};
use clap::{Parser, Subcommand, ValueEnum};
use storage::Database;
use storage::dto::scan::ScanMode;
use storage::services::{
    attendance, roster,
    reveal::{self, DEFAULT_COUNTDOWN, RevealCommand},
    scoring,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "itweek-admin")]
#[command(about = "IT week attendance and scoring maintenance", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Name recorded in the audit trail
    #[arg(long, default_value = "cli")]
    actor: String,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Register teams and persons from a JSON roster
    ImportRoster {
        file: PathBuf,

        #[arg(long)]
        validate_only: bool,

        /// Where the issued badge ids are written
        #[arg(long, default_value = "./badges.json")]
        output: PathBuf,
    },
    /// Apply a list of badge scans, one id per line
    BatchScan {
        #[arg(long, value_enum)]
        mode: Mode,

        file: PathBuf,
    },
    /// Rebuild every team total from the score log
    Recalculate,
    /// Put every team back at the base score
    ResetScores,
    /// Print teams by score
    Standings,
    /// Drive the scoreboard reveal
    Reveal {
        #[command(subcommand)]
        step: RevealStep,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    TimeIn,
    TimeOut,
}

impl From<Mode> for ScanMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::TimeIn => ScanMode::TimeIn,
            Mode::TimeOut => ScanMode::TimeOut,
        }
    }
}

#[derive(Subcommand)]
enum RevealStep {
    Start {
        #[arg(long, default_value_t = DEFAULT_COUNTDOWN)]
        countdown: i32,

        /// Tick once per second, then announce the winner
        #[arg(long)]
        auto: bool,
    },
    Tick,
    Announce,
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("itweek_admin={},admin={},storage={}", log_level, log_level, log_level)
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Commands::ImportRoster {
        file,
        validate_only: true,
        ..
    } = &cli.command
    {
        let roster = RosterFile::load(file).await?;
        RosterValidator::validate(&roster)?.log_warnings();
        tracing::info!("Roster is valid");
        return Ok(());
    }

    tracing::info!("Connecting to database...");
    let db = Database::new(&cli.database_url).await?;
    db.run_migrations().await?;

    match cli.command {
        Commands::ImportRoster { file, output, .. } => {
            handle_import_roster(&db, &file, &output, &cli.actor).await?;
        }
        Commands::BatchScan { mode, file } => {
            handle_batch_scan(&db, mode.into(), &file, &cli.actor).await?;
        }
        Commands::Recalculate => {
            let teams = scoring::recalculate_all_totals(&db, &cli.actor).await?;
            tracing::info!("Recalculated {} team totals", teams.len());
        }
        Commands::ResetScores => {
            let count = scoring::reset_all_scores(&db, &cli.actor).await?;
            tracing::info!("Reset {} teams", count);
        }
        Commands::Standings => {
            for (rank, team) in roster::list_standings(&db).await?.iter().enumerate() {
                println!(
                    "{:>3}. {:<30} {:>6}  ({} members)",
                    rank + 1,
                    team.name,
                    team.score,
                    team.member_count
                );
            }
        }
        Commands::Reveal { step } => {
            handle_reveal(&db, step, &cli.actor).await?;
        }
    }

    Ok(())
}

async fn handle_import_roster(db: &Database, file: &Path, output: &Path, actor: &str) -> Result<()> {
    tracing::info!("Loading roster from: {}", file.display());
    let roster = RosterFile::load(file).await?;

    RosterValidator::validate(&roster)?.log_warnings();

    let summary = RosterImporter::new(db, actor).import(&roster).await?;

    let json = serde_json::to_string_pretty(&summary.badges)?;
    tokio::fs::write(output, json).await?;

    tracing::info!(
        "Imported {} persons ({} new teams); badges written to {}",
        summary.badges.len(),
        summary.teams_created,
        output.display()
    );

    if !summary.failures.is_empty() {
        for failure in &summary.failures {
            tracing::error!(
                "Person #{} '{}' was not imported: {}",
                failure.line,
                failure.full_name,
                failure.error
            );
        }
        return Err(AdminError::Validation(format!(
            "{} of {} persons failed to import",
            summary.failures.len(),
            summary.failures.len() + summary.badges.len()
        )));
    }

    Ok(())
}

async fn handle_batch_scan(db: &Database, mode: ScanMode, file: &Path, actor: &str) -> Result<()> {
    let badges = read_badge_file(file).await?;
    if badges.is_empty() {
        tracing::warn!("No badge ids found in {}", file.display());
        return Ok(());
    }

    tracing::info!("Scanning {} badges from {}", badges.len(), file.display());
    let results = attendance::process_scan_batch(db, &badges, mode, actor).await;

    let mut counts = BTreeMap::new();
    for result in &results {
        *counts.entry(format!("{:?}", result.status)).or_insert(0usize) += 1;
        if let Some(message) = &result.message {
            tracing::debug!("{}: {}", result.uuid, message);
        }
    }
    for (status, count) in &counts {
        tracing::info!("  {}: {}", status, count);
    }

    Ok(())
}

async fn handle_reveal(db: &Database, step: RevealStep, actor: &str) -> Result<()> {
    match step {
        RevealStep::Start { countdown, auto } => {
            reveal::transition(db, RevealCommand::Start { countdown }, actor).await?;
            tracing::info!("Countdown started at {}", countdown);
            if auto {
                run_countdown(db, actor).await?;
            }
        }
        RevealStep::Tick => {
            let settings = reveal::transition(db, RevealCommand::Tick, actor).await?;
            tracing::info!("Countdown at {}", settings.countdown);
        }
        RevealStep::Announce => announce(db, actor).await?,
        RevealStep::Reset => {
            reveal::transition(db, RevealCommand::Reset, actor).await?;
            tracing::info!("Scoreboard back to live view");
        }
    }
    Ok(())
}

async fn run_countdown(db: &Database, actor: &str) -> Result<()> {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    interval.tick().await;

    loop {
        interval.tick().await;
        // Fails with an invalid transition if someone reset the reveal meanwhile.
        let settings = reveal::transition(db, RevealCommand::Tick, actor).await?;
        tracing::info!("{}", settings.countdown);
        if settings.countdown == 0 {
            break;
        }
    }

    announce(db, actor).await
}

async fn announce(db: &Database, actor: &str) -> Result<()> {
    let settings = reveal::transition(db, RevealCommand::Announce, actor).await?;
    tracing::info!(
        "Winner: {} with {}",
        settings.winner_name.as_deref().unwrap_or("-"),
        settings.winner_score.unwrap_or_default()
    );
    Ok(())
}
