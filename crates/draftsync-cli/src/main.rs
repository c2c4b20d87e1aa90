//! Draftsync CLI - drive the draft engine from the terminal
//!
//! Drafts persist as JSON snapshots under the data directory; pass
//! `--endpoint` (or set `DRAFTSYNC_ENDPOINT`) to sync against a remote
//! draft service.

mod commands;
mod error;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use draftsync_core::{SortBy, SortOrder};
use tracing_subscriber::EnvFilter;

use crate::commands::common::{open_engine, resolve_data_dir};
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "drafts")]
#[command(about = "Local-first campaign draft editing with background sync")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory for draft snapshots (defaults to the platform data dir)
    #[arg(long, value_name = "PATH", global = true)]
    data_dir: Option<PathBuf>,

    /// Sync service base URL (or DRAFTSYNC_ENDPOINT)
    #[arg(long, value_name = "URL", global = true)]
    endpoint: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new draft
    #[command(alias = "new")]
    Create {
        /// Owner user id
        #[arg(long)]
        owner: String,
        /// Initial campaign title
        #[arg(long)]
        title: Option<String>,
        /// Initial description
        #[arg(long)]
        description: Option<String>,
        /// Funding goal in satoshis
        #[arg(long)]
        goal: Option<u64>,
    },
    /// Update one form field of a draft
    Edit {
        /// Draft ID
        id: String,
        /// Field name (title, description, bitcoin_address, goal_amount, ...)
        field: String,
        /// New value (comma-separated for list fields)
        value: String,
    },
    /// Move the draft to another wizard step
    Step {
        /// Draft ID
        id: String,
        /// Target step
        step: u32,
    },
    /// Show one draft
    Show {
        /// Draft ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List known drafts
    List {
        /// Filter by owner user id
        #[arg(long)]
        owner: Option<String>,
        /// Sort key
        #[arg(long, value_enum, default_value_t = SortField::Modified)]
        sort: SortField,
        /// Sort direction
        #[arg(long, value_enum, default_value_t = Order::Desc)]
        order: Order,
        /// Number of drafts to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Number of drafts to skip
        #[arg(long, default_value = "0")]
        offset: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sync one draft with the remote service now
    Sync {
        /// Draft ID
        id: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortField {
    Modified,
    Created,
    Title,
}

impl From<SortField> for SortBy {
    fn from(value: SortField) -> Self {
        match value {
            SortField::Modified => Self::LastModified,
            SortField::Created => Self::Created,
            SortField::Title => Self::Title,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Order {
    Asc,
    Desc,
}

impl From<Order> for SortOrder {
    fn from(value: Order) -> Self {
        match value {
            Order::Asc => Self::Asc,
            Order::Desc => Self::Desc,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let data_dir = resolve_data_dir(cli.data_dir)?;
    let endpoint = cli
        .endpoint
        .or_else(|| env::var("DRAFTSYNC_ENDPOINT").ok())
        .filter(|endpoint| !endpoint.trim().is_empty());
    let engine = open_engine(&data_dir, endpoint.as_deref())?;

    match cli.command {
        Commands::Create {
            owner,
            title,
            description,
            goal,
        } => commands::create::run_create(
            &engine,
            &owner,
            title.as_deref(),
            description.as_deref(),
            goal,
        ),
        Commands::Edit { id, field, value } => {
            commands::edit::run_edit(&engine, &id, &field, &value)
        }
        Commands::Step { id, step } => commands::edit::run_step(&engine, &id, step),
        Commands::Show { id, json } => commands::show::run_show(&engine, &id, json),
        Commands::List {
            owner,
            sort,
            order,
            limit,
            offset,
            json,
        } => commands::list::run_list(
            &engine,
            owner.as_deref(),
            sort.into(),
            order.into(),
            limit,
            offset,
            json,
        ),
        Commands::Sync { id } => {
            commands::sync::run_sync(&engine, &id, endpoint.is_some()).await
        }
    }
}
