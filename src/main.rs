//! Sumi-Check main entry point
//!
//! This is the command-line interface for the Sumi-Check page verifier.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use sumi_check::checker::verify;
use sumi_check::config::{load_config_with_hash, Config};
use tracing_subscriber::EnvFilter;

/// Sumi-Check: verify pages and everything they link to
///
/// Sumi-Check fetches each configured page, checks it against the enabled
/// rules, verifies every resource it references and reports the issues found.
#[derive(Parser, Debug)]
#[command(name = "sumi-check")]
#[command(version)]
#[command(about = "Verify web pages and the resources they reference", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print a summary of issues grouped by page at the end
    #[arg(long)]
    summary: bool,

    /// Validate config and list the pages that would be checked
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match load_config_with_hash(&cli.config)
        .with_context(|| format!("cannot load {}", cli.config.display()))
    {
        Ok((config, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            return ExitCode::from(2);
        }
    };

    if cli.summary {
        config.report.summary = true;
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return ExitCode::SUCCESS;
    }

    match handle_verify(config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_check=info,warn"),
            1 => EnvFilter::new("sumi_check=debug,info"),
            2 => EnvFilter::new("sumi_check=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what would be checked
fn handle_dry_run(config: &Config) {
    println!("=== Sumi-Check Dry Run ===\n");

    println!("Pages ({}):", config.pages.len());
    for page in &config.pages {
        println!("  - {}", page);
    }

    println!("\nChecks:");
    println!("  Links: {}", config.checks.links);
    println!("  XHTML: {}", config.checks.xhtml);
    println!("  Caching: {}", config.checks.caching);
    println!("  Compression: {}", config.checks.compression);
    match config.checks.max_response_time {
        Some(max) => println!("  Max response time: {}ms", max),
        None => println!("  Max response time: none"),
    }

    println!("\nLink policy:");
    println!("  No redirects: {}", config.links.no_redirects);
    println!("  No local links: {}", config.links.no_local_links);
    println!("  No empty fragments: {}", config.links.no_empty_fragments);
    println!("  Only same domain: {}", config.links.only_same_domain);
    println!("  Query hashes: {}", config.links.query_hashes);
    println!("  Prefer secure: {}", config.links.prefer_secure);
    println!("  Ignored links: {}", config.links.ignore.len());

    println!("\nHTTP:");
    if config.http.user_agent.is_empty() {
        println!("  User agent: (none)");
    } else {
        println!("  User agent: {}", config.http.user_agent);
    }
    println!("  Timeout: {}s", config.http.timeout);
    println!("  Summary: {}", config.report.summary);

    println!("\n✓ Configuration is valid");
}

/// Runs the verification; Ok(true) when no issues were found
async fn handle_verify(config: Config) -> anyhow::Result<bool> {
    tracing::info!("Checking {} pages", config.pages.len());

    let report = verify(config).await.context("verification failed")?;
    Ok(report.is_success())
}
