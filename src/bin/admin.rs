//! CLI administration tool for tinyurl.
//!
//! Shortens, resolves and lists URLs and performs database checks directly
//! against the configured store, without going through the HTTP API or its
//! rate limiter.
//!
//! # Usage
//!
//! ```bash
//! # Shorten a URL on behalf of a user
//! cargo run --bin admin -- shorten https://example.com --owner 7f9c...
//!
//! # Resolve a code
//! cargo run --bin admin -- resolve aB3xYz
//!
//! # List a user's URLs, newest first
//! cargo run --bin admin -- list --owner 7f9c...
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server: `DATABASE_URL` (or `DB_*`) is required, `REDIS_URL`
//! (or `REDIS_*`) is optional.

use tinyurl::application::services::{LinkService, ResolveService};
use tinyurl::config::Config;
use tinyurl::infrastructure::persistence::PgUrlRepository;
use tinyurl::server::{connect_cache, connect_database};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// CLI tool for managing tinyurl.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Shorten a URL
    Shorten {
        /// URL to shorten (`https://` is assumed when no scheme is given)
        url: String,

        /// Owner to record on a newly created code
        #[arg(short, long)]
        owner: Option<Uuid>,
    },

    /// Resolve a short code to its URL
    Resolve {
        /// Six-character short code
        code: String,
    },

    /// List URLs created by an owner
    List {
        #[arg(short, long)]
        owner: Uuid,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    let pool = connect_database(&config).await?;

    let repository = Arc::new(PgUrlRepository::new(
        Arc::new(pool.clone()),
        config.store_timeout(),
    ));

    match cli.command {
        Commands::Shorten { url, owner } => {
            let service = LinkService::new(repository);
            shorten(&service, &url, owner).await?;
        }
        Commands::Resolve { code } => {
            let cache = connect_cache(&config).await;
            let service = ResolveService::new(repository, cache, config.cache_settings());
            resolve(&service, &code).await?;
        }
        Commands::List { owner } => {
            let service = LinkService::new(repository);
            list(&service, owner).await?;
        }
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn shorten(service: &LinkService, url: &str, owner: Option<Uuid>) -> Result<()> {
    let shortened = service
        .shorten(url, owner)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to shorten URL: {}", e))?;

    if shortened.is_new {
        println!("{}", "Short code created".green().bold());
    } else {
        println!("{}", "URL already shortened".yellow());
    }
    println!("  Code: {}", shortened.code.cyan().bold());

    Ok(())
}

async fn resolve(service: &ResolveService, code: &str) -> Result<()> {
    let resolved = service
        .resolve(code)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to resolve {}: {}", code, e))?;

    println!("  URL:    {}", resolved.url.bright_white());
    println!(
        "  Source: {}",
        if resolved.from_cache {
            "cache".green()
        } else {
            "database".bright_black()
        }
    );

    Ok(())
}

/// Prints an owner's URLs as a table, newest first.
async fn list(service: &LinkService, owner: Uuid) -> Result<()> {
    let records = service
        .list_by_owner(owner)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    if records.is_empty() {
        println!("{}", "No URLs found for this owner".yellow());
        return Ok(());
    }

    println!(
        "  {:<8} {:<18} {}",
        "CODE".bold(),
        "CREATED".bold(),
        "URL".bold()
    );

    for record in &records {
        println!(
            "  {:<8} {:<18} {}",
            record.code.cyan(),
            record
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            record.original_url
        );
    }

    println!();
    println!(
        "  Total: {}",
        records.len().to_string().bright_white().bold()
    );

    Ok(())
}

/// Displays total and owned record counts.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls")
        .fetch_one(pool)
        .await?;

    let owned: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls WHERE user_id IS NOT NULL")
        .fetch_one(pool)
        .await?;

    println!("  URLs:       {}", total.to_string().bright_green().bold());
    println!("  With owner: {}", owned.to_string().bright_green().bold());

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Migrate => {
            sqlx::migrate!("./migrations")
                .run(pool)
                .await
                .context("Failed to run database migrations")?;

            println!("{}", "Migrations applied".green().bold());
        }
    }

    Ok(())
}
