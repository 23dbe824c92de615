//! projgamma - Custom gamma tables for network-controlled projectors
//!
//! Builds a tone curve from a handful of parameters, previews the resulting
//! table and uploads it to the projector's custom gamma slot.

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod logging;

use commands::Session;
use config::CliConfig;
use logging::LogConfig;

#[derive(Parser)]
#[command(name = "projgamma")]
#[command(author, version, about = "Custom gamma tables for network-controlled projectors")]
#[command(long_about = "
Generates a custom gamma table from tone curve parameters and uploads it to
the projector over its network control port.

Examples:
  projgamma commands                             # List script commands
  projgamma run 'lp hdr pq; bw 30; show'         # Preview a curve
  projgamma --host 192.168.1.20 run 'lp hdr pq; Pw'
  projgamma run 'eo bt1886; bm 115; rec sdr.json'
  projgamma --record sdr.json run Pw             # Upload a saved curve
  projgamma run --file living-room.pgs
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Config file (default: ./projgamma.yaml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Projector host name or address
    #[arg(long, global = true)]
    host: Option<String>,

    /// Projector control port
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Parameter record to start from (JSON)
    #[arg(short, long, global = true)]
    record: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a command script
    #[command(visible_alias = "r")]
    Run(RunArgs),

    /// List built-in presets
    #[command(visible_alias = "p")]
    Presets,

    /// List script commands
    #[command(visible_alias = "c")]
    Commands,
}

#[derive(Args)]
pub struct RunArgs {
    /// Commands separated by ';'
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub script: Vec<String>,

    /// Read commands from a file first
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = logging::init(&LogConfig {
        verbosity: cli.verbose,
        file: cli.log_file.clone(),
    })?;

    match cli.command {
        Commands::Run(args) => {
            let dir = std::env::current_dir().context("Failed to get working directory")?;
            let mut config = CliConfig::load(cli.config.as_deref(), &dir)?;
            config.override_link(cli.host.as_deref(), cli.port);
            let mut session = Session::from_config(&config, cli.record.as_deref())?;
            commands::script::run(args, &mut session, cli.verbose)
        }
        Commands::Presets => commands::presets::run(cli.verbose),
        Commands::Commands => commands::table::run(cli.verbose),
    }
}
