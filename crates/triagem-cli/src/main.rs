//! Triagem CLI
//!
//! Command-line admin dashboard for reviewing volunteer applications.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use triagem_core::{AuthClient, Config, RestStore, Status};

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "triagem")]
#[command(about = "Triagem - review volunteer applications")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in as a reviewer
    Login {
        /// Email (prompted if omitted)
        #[arg(long)]
        email: Option<String>,
    },
    /// Sign out and discard the stored session
    Logout,
    /// List applications
    #[command(alias = "ls")]
    List {
        /// Filter by status (pending, approved, rejected)
        #[arg(short, long)]
        status: Option<Status>,
        /// Filter by region code
        #[arg(short, long)]
        region: Option<String>,
        /// Case-insensitive search on name or email
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one application in full
    Show {
        /// Application ID
        id: String,
    },
    /// Approve a pending application
    Approve {
        /// Application ID
        id: String,
    },
    /// Reject a pending application
    Reject {
        /// Application ID
        id: String,
    },
    /// Delete an application
    #[command(alias = "rm")]
    Delete {
        /// Application ID
        id: String,
    },
    /// Show aggregate statistics
    Stats,
    /// Follow the live change feed, reporting stats as records change
    Watch,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Print the config file path
    Path,
    /// Set a configuration value
    Set {
        /// Configuration key (base_url, api_key, table, realtime_url, data_dir)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Commands that don't need the store
    match &cli.command {
        Commands::Config { command } => {
            return commands::config::handle(command.clone(), &output);
        }
        Commands::Login { email } => {
            let config = Config::load()?;
            return commands::auth::login(&config, email.clone(), &output).await;
        }
        Commands::Logout => {
            let config = Config::load()?;
            return commands::auth::logout(&config, &output).await;
        }
        _ => {}
    }

    let config = Config::load()?;
    let store = build_store(&config)?;

    match cli.command {
        Commands::Login { .. } | Commands::Logout | Commands::Config { .. } => unreachable!(),
        Commands::List {
            status,
            region,
            search,
        } => commands::list::run(store, status, region, search, &output).await,
        Commands::Show { id } => commands::show::run(store, id, &output).await,
        Commands::Approve { id } => {
            commands::review::run(store, id, Status::Approved, &output).await
        }
        Commands::Reject { id } => {
            commands::review::run(store, id, Status::Rejected, &output).await
        }
        Commands::Delete { id } => commands::review::delete(store, id, &output).await,
        Commands::Stats => commands::stats::run(store, &output).await,
        Commands::Watch => commands::watch::run(store, &output).await,
    }
}

/// Build an authenticated store, or fail with a sign-in hint
fn build_store(config: &Config) -> Result<RestStore> {
    let auth = AuthClient::new(config);
    let session = auth
        .session()
        .context("Not signed in. Run 'triagem login' first.")?;
    tracing::debug!(email = %session.email, "Using stored session");
    Ok(RestStore::new(config).with_access_token(session.access_token))
}
