//! `thaiid` command line

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::{Overrides, load_config};

/// Workspace crates logged at debug level with `--verbose`
const VERBOSE_FILTER: &str = "info,thaiid=debug,thaiid_apdu_core=debug,\
    thaiid_apdu_transport_pcsc=debug,thaiid_card=debug,thaiid_bridge=debug,thaiid_relay=debug";

#[derive(Parser, Debug)]
#[command(version, about = "Read Thai national ID cards and relay them to a controller")]
struct Cli {
    /// Config file (defaults to ~/.thaiid/thaiid.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Controller URL; `http://` is assumed without a scheme
    #[arg(long, global = true)]
    server_url: Option<String>,

    /// Device id reported to the controller
    #[arg(long, global = true)]
    device_id: Option<String>,

    /// Reader name to use (first reader when not specified)
    #[arg(short, long, global = true)]
    reader: Option<String>,

    /// Debug output for the thaiid crates
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available readers
    List,

    /// Read the card once and print the record as JSON
    Read {
        /// Also read the photo and write it to this file
        #[arg(long)]
        photo: Option<PathBuf>,
    },

    /// Relay card reads to the controller until Ctrl-C
    Run {
        /// Read as soon as the reader is ready and after every clear
        #[arg(long)]
        auto_read: bool,
    },

    /// Print the last record the controller holds
    Latest,
}

fn setup_logging(verbose: bool) {
    let default = if verbose { VERBOSE_FILTER } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(true)
        .init();
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let auto_read = matches!(cli.command, Commands::Run { auto_read: true });
    let overrides = Overrides {
        server_url: cli.server_url,
        device_id: cli.device_id,
        reader: cli.reader,
        auto_read: auto_read.then_some(true),
    };
    let config = load_config(cli.config.as_deref(), &overrides)?;

    match cli.command {
        Commands::List => commands::list(&config),
        Commands::Read { photo } => commands::read(&config, photo).await,
        Commands::Run { .. } => commands::run(&config).await,
        Commands::Latest => commands::latest(&config).await,
    }
}
