//! CLI administration tool for linkpeek.
//!
//! Works directly against the configured store, without going through the
//! HTTP API. Uses the same environment variables as the server.
//!
//! # Usage
//!
//! ```bash
//! # Shorten a URL
//! cargo run --bin admin -- shorten https://example.com/very/long --alias promo
//!
//! # Inspect a link without counting a hit
//! cargo run --bin admin -- info promo
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Import a JSON snapshot into the configured store
//! cargo run --bin admin -- import urls.json
//! ```

use linkpeek::application::services::{ShortenRequest, ShortenService};
use linkpeek::config::{self, Config};
use linkpeek::domain::entities::{UrlMetadata, UrlRecord};
use linkpeek::domain::repositories::UrlStore;
use linkpeek::infrastructure::metadata::{
    HttpMetadataFetcher, MetadataFetcher, NullMetadataFetcher,
};
use linkpeek::infrastructure::persistence::{self, read_snapshot};
use linkpeek::utils::Validator;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// CLI tool for managing linkpeek.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a short link
    Shorten {
        /// Target URL (http or https)
        url: String,

        /// Custom alias instead of a generated code
        #[arg(short, long)]
        alias: Option<String>,

        /// Preview title
        #[arg(long)]
        title: Option<String>,

        /// Preview description
        #[arg(long)]
        description: Option<String>,

        /// Preview image URL
        #[arg(long)]
        image: Option<String>,

        /// Preview theme color
        #[arg(long)]
        color: Option<String>,
    },

    /// Show a link without counting a hit
    Info {
        /// Short code or alias
        code: String,
    },

    /// Show statistics
    Stats,

    /// Import a JSON snapshot (current or legacy format)
    Import {
        /// Snapshot file
        path: PathBuf,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env().context("Invalid configuration")?;

    let opened = persistence::open(&config.storage_options())
        .await
        .context("Failed to open storage")?;

    let result = match cli.command {
        Commands::Shorten {
            url,
            alias,
            title,
            description,
            image,
            color,
        } => {
            let has_metadata = title.is_some()
                || description.is_some()
                || image.is_some()
                || color.is_some();
            let metadata = has_metadata.then(|| UrlMetadata {
                title: title.unwrap_or_default(),
                description: description.unwrap_or_default(),
                image: image.unwrap_or_default(),
                color: color.unwrap_or_default(),
            });

            let mut request = ShortenRequest::new(url);
            request.custom_alias = alias;
            request.metadata = metadata;

            shorten(&config, opened.store.clone(), request).await
        }
        Commands::Info { code } => info(opened.store.as_ref(), &config, &code).await,
        Commands::Stats => stats(opened.store.as_ref(), &config).await,
        Commands::Import { path, yes } => {
            let validator = Validator::new(config.service_hostname.clone());
            import(opened.store.as_ref(), &validator, &path, yes).await
        }
    };

    opened.close().await;
    result
}

/// Runs a request through the full shortening service.
async fn shorten(config: &Config, store: Arc<dyn UrlStore>, request: ShortenRequest) -> Result<()> {
    println!("{}", "✂️  Shorten URL".bright_blue().bold());
    println!();

    let fetcher: Arc<dyn MetadataFetcher> = if config.metadata_fetch {
        Arc::new(HttpMetadataFetcher::new(config.metadata_timeout())?)
    } else {
        Arc::new(NullMetadataFetcher::new())
    };

    let service = ShortenService::new(
        store,
        fetcher,
        config.code_generator()?,
        Validator::new(config.service_hostname.clone()),
    )
    .with_fetch_timeout(config.metadata_timeout());

    let shortened = service
        .shorten(request)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to shorten: {}", e))?;

    if shortened.created {
        println!("{}", "✅ Link created".green().bold());
    } else {
        println!("{}", "ℹ️  Existing link returned".yellow());
    }
    println!();
    print_record(&shortened.record, config);

    Ok(())
}

/// Prints one record.
async fn info(store: &dyn UrlStore, config: &Config, code: &str) -> Result<()> {
    let record = store
        .get(code.trim())
        .await
        .map_err(|e| anyhow::anyhow!("Storage error: {}", e))?
        .context("Link not found")?;

    print_record(&record, config);
    Ok(())
}

/// Displays store statistics.
///
/// Shows the backend in use and the number of stored links.
async fn stats(store: &dyn UrlStore, config: &Config) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let links = store
        .count()
        .await
        .map_err(|e| anyhow::anyhow!("Storage error: {}", e))?;

    println!(
        "  Backend: {}",
        config.storage_backend.to_string().bright_white()
    );
    println!("  Links:   {}", links.to_string().bright_green().bold());
    println!();

    Ok(())
}

/// Loads a snapshot and upserts every valid record after confirmation.
///
/// Existing records with the same code are overwritten, hit counts included.
/// Records whose code or target breaks the shortening rules are listed and skipped.
async fn import(
    store: &dyn UrlStore,
    validator: &Validator,
    path: &Path,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "📥 Import Snapshot".bright_blue().bold());
    println!();

    let records = read_snapshot(path)
        .await
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;

    if records.is_empty() {
        println!("{}", "  Snapshot is empty, nothing to import".yellow());
        return Ok(());
    }

    println!(
        "  {} records in {}",
        records.len().to_string().bright_white().bold(),
        path.display().to_string().cyan()
    );

    let (records, rejected) = split_valid(validator, records);
    if !rejected.is_empty() {
        println!(
            "  {}",
            format!("⚠️  Skipping {} invalid records:", rejected.len()).yellow()
        );
        for (code, reason) in &rejected {
            println!("    {} {}", code.cyan(), reason.bright_black());
        }
    }
    println!();

    if records.is_empty() {
        println!("{}", "  No valid records to import".yellow());
        return Ok(());
    }

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Import these records? Existing codes are overwritten")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let total = records.len();
    for record in records {
        let code = record.code.clone();
        store
            .put(record)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to import {}: {}", code, e))?;
    }

    println!();
    println!(
        "{}",
        format!("✅ Imported {total} records").green().bold()
    );
    println!();

    Ok(())
}

/// Separates records that pass [`Validator::validate_record`] from the rest,
/// which come back as `(code, reason)` pairs.
fn split_valid(
    validator: &Validator,
    records: Vec<UrlRecord>,
) -> (Vec<UrlRecord>, Vec<(String, String)>) {
    let mut valid = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();

    for record in records {
        match validator.validate_record(&record) {
            Ok(()) => valid.push(record),
            Err(e) => rejected.push((record.code, e.to_string())),
        }
    }

    (valid, rejected)
}

fn print_record(record: &UrlRecord, config: &Config) {
    let short_url = format!(
        "https://{}/{}",
        config.service_hostname.trim_end_matches('/'),
        record.code
    );

    println!("  Code:    {}", record.code.cyan());
    println!("  Short:   {}", short_url.bright_yellow().bold());
    println!("  Target:  {}", record.target_url.bright_white());
    println!("  Hits:    {}", record.hit_count.to_string().bright_green());
    println!(
        "  Created: {}",
        record
            .created_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );

    if let Some(meta) = &record.meta {
        println!("  {}", "Preview:".bright_white().bold());
        for (label, value) in [
            ("title", &meta.title),
            ("description", &meta.description),
            ("image", &meta.image),
            ("color", &meta.color),
        ] {
            if !value.is_empty() {
                println!("    {:<12} {}", label.bright_black(), value);
            }
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, url: &str) -> UrlRecord {
        UrlRecord::new(
            code.to_string(),
            url.to_string(),
            None,
            UrlMetadata::signature(None),
        )
    }

    #[test]
    fn test_split_valid_drops_records_breaking_rules() {
        let validator = Validator::new("s.example.com");
        let records = vec![
            record("good1", "https://example.com/a"),
            record("has.dot", "https://example.com/b"),
            record(&"x".repeat(33), "https://example.com/c"),
            record("api", "https://example.com/d"),
            record("good2", "ftp://example.com/e"),
            record("good3", "https://s.example.com/loop"),
            record("good4", "https://example.org/f"),
        ];

        let (valid, rejected) = split_valid(&validator, records);

        let kept: Vec<&str> = valid.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(kept, vec!["good1", "good4"]);

        let skipped: Vec<&str> = rejected.iter().map(|(code, _)| code.as_str()).collect();
        assert_eq!(skipped.len(), 5);
        assert!(skipped.contains(&"has.dot"));
        assert!(skipped.contains(&"api"));
        assert!(skipped.contains(&"good3"));
        assert!(rejected.iter().all(|(_, reason)| !reason.is_empty()));
    }
}
