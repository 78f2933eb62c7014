mod catalog;
mod reference;

use std::path::PathBuf;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use shopdesk_core::{AppConfig, ConfigError};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "shopdesk")]
#[command(about = "Catalog entry tooling for the shopdesk admin console")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// What a draft file describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DraftKind {
    Product,
    Category,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check a draft file and list every invalid field
    Validate {
        file: PathBuf,
        #[arg(long, value_enum, default_value = "product")]
        kind: DraftKind,
    },
    /// Print the multipart fields a draft encodes to
    Encode {
        file: PathBuf,
        #[arg(long, value_enum, default_value = "product")]
        kind: DraftKind,
        /// Fetch the selected variation and add any missing price rows first
        #[arg(long)]
        sync_rows: bool,
    },
    /// Validate, encode and send a draft to the console API
    Submit {
        file: PathBuf,
        #[arg(long, value_enum, default_value = "product")]
        kind: DraftKind,
        #[arg(long)]
        sync_rows: bool,
        /// Stop after encoding; nothing is sent
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the reference lists the product form selects from
    Reference {
        /// Print the template entries of one variation
        #[arg(long)]
        variation: Option<i64>,
    },
    /// Upload a product spreadsheet (.xls/.xlsx)
    Import { file: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = shopdesk_core::load_app_config();

    let log_level = config.as_ref().map_or("info", |c| c.log_level.as_str());
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Validate { file, kind } => {
            let business_id = config.map_or(0, |c| c.business_id);
            catalog::run_validate(&file, kind, business_id)
        }
        Commands::Encode {
            file,
            kind,
            sync_rows,
        } => catalog::run_encode(&required(config)?, &file, kind, sync_rows).await,
        Commands::Submit {
            file,
            kind,
            sync_rows,
            dry_run,
        } => catalog::run_submit(&required(config)?, &file, kind, sync_rows, dry_run).await,
        Commands::Reference { variation } => {
            reference::run_reference(&required(config)?, variation).await
        }
        Commands::Import { file } => reference::run_import(&required(config)?, &file).await,
    }
}

fn required(config: Result<AppConfig, ConfigError>) -> anyhow::Result<AppConfig> {
    config.context("failed to load configuration")
}
