use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use svk_pipeline::RunStatus;
use tracing::error;

mod commands;

use commands::ingest::PlanKind;

#[derive(Parser)]
#[command(name = "svk")]
#[command(about = "SVK hourly consumption store: ingest, validate, summarize", long_about = None)]
struct Cli {
    /// Layered config paths in merge order (later files override earlier ones)
    #[arg(long = "config", global = true)]
    config_paths: Vec<PathBuf>,

    /// Anchor date for trailing windows, YYYY-MM-DD (default: today, local time)
    #[arg(long = "as-of", global = true)]
    as_of: Option<NaiveDate>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the quality checks and write report artifacts.
    /// Exit 0 = clean, 1 = issues found, 2 = no data could be loaded.
    Check {
        /// Store to validate (default: the configured master file)
        #[arg(long = "data-file")]
        data_file: Option<PathBuf>,

        /// Where reports are written (default: paths.report_dir)
        #[arg(long = "output-dir")]
        output_dir: Option<PathBuf>,
    },

    /// Merge a scraped batch into the store.
    Ingest {
        #[arg(value_enum)]
        plan: PlanKind,

        /// Scraped batch CSV to replay
        #[arg(long)]
        batch: PathBuf,

        /// Days to request (daily/custom; default from ingest config)
        #[arg(long)]
        days: Option<u32>,

        /// First day to request, YYYY-MM-DD (custom only)
        #[arg(long = "start-date")]
        start_date: Option<NaiveDate>,
    },

    /// Print a markdown summary of the store (also appended to
    /// $GITHUB_STEP_SUMMARY when set).
    Summary,

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    // Silent if the file does not exist; CI injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();
    match run(cli) {
        Ok(status) => ExitCode::from(status.exit_code()),
        Err(e) => {
            error!(error = %format!("{e:#}"), "cli/failed");
            eprintln!("error: {e:#}");
            ExitCode::from(RunStatus::CouldNotRun.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<RunStatus> {
    match cli.cmd {
        Commands::ConfigHash { paths } => commands::config_hash(&paths),

        Commands::Check {
            data_file,
            output_dir,
        } => {
            let ctx = commands::load_context(&cli.config_paths, cli.as_of)?;
            commands::check::run(&ctx, data_file, output_dir)
        }

        Commands::Ingest {
            plan,
            batch,
            days,
            start_date,
        } => {
            let ctx = commands::load_context(&cli.config_paths, cli.as_of)?;
            let plan = commands::ingest::plan_for(plan, &ctx.settings.ingest, days, start_date)?;
            commands::ingest::run(&ctx, plan, &batch)
        }

        Commands::Summary => {
            let ctx = commands::load_context(&cli.config_paths, cli.as_of)?;
            commands::summary::run(&ctx)
        }
    }
}

/// Logs go to stderr; stdout carries only the `key=value` result lines.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
