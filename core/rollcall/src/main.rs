//! rollcall: command-line client for the shared status board.
//!
//! ## Subcommands
//!
//! - `board`: pull once and print the board
//! - `watch`: keep pulling and redraw the board
//! - `set`: record a member's status
//! - `clear`: remove a member's status
//! - `roster`: list every member with their current status
//!
//! Server failures never abort a command; the board falls back to the local
//! cache and writes are kept locally until the next sync.

mod commands;
mod logging;
mod remote;
mod render;

use std::io;
use std::time::Duration;

use clap::{Parser, Subcommand};

use commands::{CommandError, StatusArgs};
use remote::RemoteStatusStore;
use rollcall_core::{Config, LocalCache, StorageConfig, SyncEngine};

#[derive(Parser)]
#[command(name = "rollcall")]
#[command(about = "Who is in the room, and is it enough")]
#[command(version)]
struct Cli {
    /// Status server URL (overrides config and ROLLCALL_SERVER_URL)
    #[arg(long, global = true, value_name = "URL")]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current board
    Board,

    /// Redraw the board on every poll
    Watch {
        /// Seconds between polls (defaults to config, then 5)
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,
    },

    /// Set a member's status
    Set {
        /// Roster name, quoted if it has spaces
        #[arg(value_name = "NAME")]
        name: String,

        #[command(subcommand)]
        status: StatusArgs,
    },

    /// Remove a member's status
    Clear {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// List roster members and their status
    Roster,
}

fn main() {
    let cli = Cli::parse();

    let storage = match StorageConfig::resolve() {
        Ok(storage) => storage,
        Err(err) => fail(&err),
    };
    if let Err(err) = storage.ensure_dirs() {
        eprintln!("rollcall: cannot create {}: {}", storage.root().display(), err);
    }
    let _logging_guard = logging::init(&storage.logs_dir());

    let config = match Config::load(&storage) {
        Ok(config) => config,
        Err(err) => fail(&err),
    };
    let server_url = cli.server.unwrap_or_else(|| config.server_url.clone());
    let store = match RemoteStatusStore::new(&server_url) {
        Ok(store) => store,
        Err(err) => fail(&err),
    };
    tracing::debug!(
        server = %store.base_url(),
        command = command_name(&cli.command),
        "rollcall started"
    );

    let mut engine = SyncEngine::new(store, LocalCache::new(&storage), config.quorum);
    let mut out = io::stdout().lock();

    let result = match cli.command {
        Commands::Board => commands::board(&mut engine, &mut out),
        Commands::Watch { interval } => {
            let interval = interval
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.poll_interval());
            commands::watch(&mut engine, interval, &mut out)
        }
        Commands::Set { name, status } => {
            commands::set(&mut engine, &config.roster, &name, status, &mut out).map(|_| ())
        }
        Commands::Clear { name } => {
            commands::clear(&mut engine, &config.roster, &name, &mut out).map(|_| ())
        }
        Commands::Roster => commands::roster(&mut engine, &config.roster, &mut out),
    };

    if let Err(err) = result {
        match err {
            // Reader went away (e.g. piped into `head`).
            CommandError::Output(ref io_err) if io_err.kind() == io::ErrorKind::BrokenPipe => {}
            _ => fail(&err),
        }
    }
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Board => "board",
        Commands::Watch { .. } => "watch",
        Commands::Set { .. } => "set",
        Commands::Clear { .. } => "clear",
        Commands::Roster => "roster",
    }
}

fn fail(err: &dyn std::fmt::Display) -> ! {
    tracing::error!(error = %err, "rollcall failed");
    eprintln!("rollcall: {}", err);
    std::process::exit(1);
}
