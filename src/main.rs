//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `synthetic_checks` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use synthetic_checks::initialization::init_logger_with;
use synthetic_checks::{run, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists), falling back
    // to a .env next to the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let config = Config::parse();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    match run(config).await {
        Ok(report) => {
            if report.is_clean() {
                println!(
                    "✅ {} application{} passed in {:.1}s",
                    report.evaluated,
                    if report.evaluated == 1 { "" } else { "s" },
                    report.elapsed_seconds
                );
            } else {
                println!(
                    "⚠️ {} of {} application{} failed in {:.1}s - failures reported",
                    report.failures.len(),
                    report.evaluated,
                    if report.evaluated == 1 { "" } else { "s" },
                    report.elapsed_seconds
                );
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("synthetic_checks error: {:#}", e);
            process::exit(1);
        }
    }
}
