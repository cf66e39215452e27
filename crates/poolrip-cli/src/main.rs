use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use poolrip_core::{CONFIG_FILE, Config};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod hex_utils;
mod session;
mod shutdown;

use session::Session;
use shutdown::ShutdownSignal;

#[derive(Parser)]
#[command(name = "poolrip")]
#[command(about = "Black Ops 3 xanim asset extractor")]
#[command(version)]
struct Args {
    /// Configuration file
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Attach to this process id instead of searching by name
    #[arg(long, global = true)]
    pid: Option<u32>,

    /// Asset pool table offset from the module base (hex)
    #[arg(long, global = true, value_parser = hex_utils::parse_hex_arg)]
    pool_table: Option<u64>,

    /// Root directory for exported files
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List animations in the xanim pool
    List {
        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export animations to .xanim_raw files
    Export {
        /// Asset names to export
        names: Vec<String>,
        /// Export every animation in the pool
        #[arg(long, conflicts_with = "names")]
        all: bool,
    },
    /// Print the decoded header of one animation as JSON
    Header {
        name: String,
    },
}

fn load_config(args: &Args) -> Config {
    let mut config = match Config::load(&args.config) {
        Ok(c) => {
            info!("Loaded config from {:?}", args.config);
            c
        }
        Err(e) => {
            warn!("Failed to load config: {}, using defaults", e);
            Config::default()
        }
    };

    if let Some(table) = args.pool_table {
        config.asset_pool_table = table;
    }
    if let Some(output) = &args.output {
        config.output_dir = output.clone();
    }
    config
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("poolrip=info".parse()?))
        .init();

    let args = Args::parse();
    let config = load_config(&args);
    let session = Session::attach(config, args.pid)?;

    match args.command {
        Command::List { json } => session.with_pool(|pool| commands::list::run(pool, json)),
        Command::Export { names, all } => {
            let shutdown = ShutdownSignal::install()?;
            let timeout = session.config().export_timeout();
            session.with_pool(|pool| {
                commands::export::run(pool, &names, all, &shutdown, timeout)
            })
        }
        Command::Header { name } => session.with_pool(|pool| commands::header::run(pool, &name)),
    }
}
