//! CLI administration tool for url-splitter.
//!
//! Provides commands for inspecting and retiring splits and performing
//! database operations without requiring HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # List active splits (add --all to include deactivated ones)
//! cargo run --bin admin -- splits list
//!
//! # Observed traffic share of a split
//! cargo run --bin admin -- splits stats spring-sale
//!
//! # Deactivate, or permanently remove, a split
//! cargo run --bin admin -- splits deactivate spring-sale
//! cargo run --bin admin -- splits purge 42 --cascade
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_*` components (required): PostgreSQL connection
//! - `CLICK_RETENTION` (optional): default purge policy, `retain` or `cascade`

use url_splitter::application::services::stats_service::DEFAULT_RECENT_CLICKS;
use url_splitter::application::services::{SplitService, StatsService};
use url_splitter::config::{ClickRetention, Config};
use url_splitter::domain::entities::{Split, SplitRef};
use url_splitter::domain::repositories::ClickWindow;
use url_splitter::infrastructure::Storage;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing url-splitter.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Inspect and manage splits
    Splits {
        #[command(subcommand)]
        action: SplitAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Split management subcommands.
#[derive(Subcommand)]
enum SplitAction {
    /// List splits, newest first
    List {
        /// Include deactivated splits
        #[arg(short, long)]
        all: bool,

        /// Maximum number of splits to show
        #[arg(short, long, default_value_t = 50)]
        limit: i64,
    },

    /// Show click distribution of a split
    Stats {
        /// Split id or slug
        split: String,

        /// Number of recent clicks to show
        #[arg(short, long, default_value_t = DEFAULT_RECENT_CLICKS)]
        recent: i64,
    },

    /// Deactivate a split (its slug becomes reusable)
    Deactivate {
        /// Split id or slug
        split: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Permanently delete a split
    Purge {
        /// Split id or slug
        split: String,

        /// Also delete its click events (overrides CLICK_RETENTION)
        #[arg(long)]
        cascade: bool,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = Config::load_database_url().context("Database is not configured")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Splits { action } => handle_split_action(action, pool).await?,
        Commands::Db { action } => handle_db_action(action, pool).await?,
    }

    Ok(())
}

/// Dispatches split management commands.
async fn handle_split_action(action: SplitAction, pool: PgPool) -> Result<()> {
    let storage = Storage::postgres(Arc::new(pool));
    let splits = SplitService::new(storage.splits.clone());

    match action {
        SplitAction::List { all, limit } => list_splits(&splits, all, limit).await?,
        SplitAction::Stats { split, recent } => {
            let stats = StatsService::new(storage.splits.clone(), storage.clicks.clone());
            show_stats(&stats, &split, recent).await?;
        }
        SplitAction::Deactivate { split, yes } => deactivate_split(&splits, &split, yes).await?,
        SplitAction::Purge {
            split,
            cascade,
            yes,
        } => {
            let retention = match std::env::var("CLICK_RETENTION") {
                Ok(v) => v.parse()?,
                Err(_) => ClickRetention::Retain,
            };
            purge_split(&splits, &split, cascade || retention.cascades(), yes).await?;
        }
    }

    Ok(())
}

/// Lists splits with status indicators.
///
/// # Output Format
///
/// ```text
/// 📋 Splits
///
///   ID    Slug                 Name                           Dests  Clicks     Status
///   ──────────────────────────────────────────────────────────────────────────────────
///   2     spring-sale          Spring sale landing test       2      1520       ACTIVE
///   1     promo                Old promo                      3      88         INACTIVE
/// ```
async fn list_splits(service: &SplitService, all: bool, limit: i64) -> Result<()> {
    println!("{}", "📋 Splits".bright_blue().bold());
    println!();

    let (splits, total) = service.list(0, limit.max(1), all).await?;

    if splits.is_empty() {
        println!("{}", "  No splits found".yellow());
        return Ok(());
    }

    println!(
        "  {:<5} {:<20} {:<30} {:<6} {:<10} {}",
        "ID".bright_white().bold(),
        "Slug".bright_white().bold(),
        "Name".bright_white().bold(),
        "Dests".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(82).bright_black());

    for split in &splits {
        let status = if split.is_active {
            "ACTIVE".green()
        } else {
            "INACTIVE".red()
        };

        println!(
            "  {:<5} {:<20} {:<30} {:<6} {:<10} {}",
            split.id.to_string().bright_black(),
            split.slug.cyan(),
            truncate(&split.name, 30),
            split.destinations.len(),
            split.total_clicks,
            status
        );
    }

    println!();
    println!(
        "  Showing {} of {}",
        splits.len().to_string().bright_white().bold(),
        total.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Prints configured weights next to observed click shares.
async fn show_stats(service: &StatsService, split_ref: &str, recent: i64) -> Result<()> {
    let stats = service
        .compute(&SplitRef::parse(split_ref), ClickWindow::default(), recent)
        .await?;

    println!(
        "{} {}",
        "📊 Statistics for".bright_blue().bold(),
        stats.split.slug.cyan().bold()
    );
    println!();
    print_split_header(&stats.split);
    println!(
        "  Recorded clicks: {}",
        stats.recorded_clicks.to_string().bright_green().bold()
    );
    println!();

    println!(
        "  {:<50} {:>9} {:>8} {:>8}",
        "Destination".bright_white().bold(),
        "Config %".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Actual %".bright_white().bold()
    );
    println!("  {}", "─".repeat(78).bright_black());

    for d in stats.destinations.iter().chain(&stats.other_destinations) {
        println!(
            "  {:<50} {:>9.1} {:>8} {:>8.1}",
            truncate(&d.url, 50),
            d.configured_percentage,
            d.clicks,
            d.percentage
        );
    }

    if !stats.recent_clicks.is_empty() {
        println!();
        println!("{}", "  Recent clicks:".bright_white().bold());
        for click in &stats.recent_clicks {
            println!(
                "  {}  {}  {}",
                click
                    .clicked_at
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
                    .bright_black(),
                click.ip.as_deref().unwrap_or("-"),
                click.destination_url
            );
        }
    }
    println!();

    Ok(())
}

/// Deactivates a split after confirmation.
async fn deactivate_split(service: &SplitService, split_ref: &str, yes: bool) -> Result<()> {
    println!("{}", "🔒 Deactivate Split".bright_blue().bold());
    println!();

    let split = service.get(&SplitRef::parse(split_ref)).await?;

    if !split.is_active {
        println!("{}", "⚠️  This split is already deactivated".yellow());
        return Ok(());
    }

    print_split_header(&split);
    println!();

    if !yes && !confirm("Deactivate this split?")? {
        println!("{}", "❌ Cancelled".red());
        return Ok(());
    }

    service.deactivate(&SplitRef::Id(split.id)).await?;

    println!("{}", "✅ Split deactivated".green().bold());
    println!();

    Ok(())
}

/// Permanently deletes a split after confirmation.
async fn purge_split(
    service: &SplitService,
    split_ref: &str,
    cascade_clicks: bool,
    yes: bool,
) -> Result<()> {
    println!("{}", "🗑️  Purge Split".bright_blue().bold());
    println!();

    let split = service.get(&SplitRef::parse(split_ref)).await?;

    print_split_header(&split);
    if cascade_clicks {
        println!("{}", "  Click events will be deleted too.".red());
    } else {
        println!("{}", "  Click events will be kept.".bright_black());
    }
    println!();

    if !yes && !confirm("Permanently delete this split?")? {
        println!("{}", "❌ Cancelled".red());
        return Ok(());
    }

    service
        .purge(&SplitRef::Id(split.id), cascade_clicks)
        .await?;

    println!("{}", "✅ Split purged".green().bold());
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(&pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(&pool)
                .await?;

            let storage = Storage::postgres(Arc::new(pool));
            let splits = SplitService::new(storage.splits.clone());
            let stats = StatsService::new(storage.splits.clone(), storage.clicks.clone());

            let (_, active) = splits.list(0, 1, false).await?;
            let (_, all) = splits.list(0, 1, true).await?;
            let clicks = stats.total_recorded_clicks().await?;

            println!("  PostgreSQL:    {}", version.bright_white());
            println!(
                "  Active splits: {} ({} including deactivated)",
                active.to_string().bright_green().bold(),
                all
            );
            println!(
                "  Click events:  {}",
                clicks.to_string().bright_green().bold()
            );
            println!();
        }
    }

    Ok(())
}

fn print_split_header(split: &Split) {
    println!("  Split:   {} ({})", split.slug.cyan(), split.name);
    println!("  ID:      {}", split.id.to_string().bright_black());
    println!("  Version: {}", split.version);
    println!("  Clicks:  {}", split.total_clicks);
}

fn confirm(prompt: &str) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

/// Shortens `s` to `max` characters, marking the cut with an ellipsis.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
