//! Tessera CLI - operator tooling for validator keys and sign state.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod logging;
mod settings;

use logging::{init_logging, level_for, LogFormat};
use settings::TesseraConfig;

/// Tessera - validator signing with double-sign protection
#[derive(Parser, Debug)]
#[command(name = "tessera")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Home directory (default: $TESSERA_HOME or ./.tessera)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the node identity and validator key if missing
    Init,

    /// Print the node ID used by peers
    ShowNodeId,

    /// Print the validator public key and address
    ShowValidator,

    /// Print the last signed height/round/step
    InspectState,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = TesseraConfig::load(cli.home.as_deref())?;

    init_logging(
        level_for(cli.verbose, &config.log_level),
        LogFormat::parse(&config.log_format),
    );

    let client = config.custody_client()?;

    let cancel = client.cancellation_token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling custody requests");
            cancel.cancel();
        }
    });

    match cli.command {
        Commands::Init => commands::init(&config, &client).await,
        Commands::ShowNodeId => commands::show_node_id(&config, &client).await,
        Commands::ShowValidator => commands::show_validator(&config, &client).await,
        Commands::InspectState => commands::inspect_state(&config),
    }
}
