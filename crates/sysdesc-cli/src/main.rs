//! Sysdesc command-line driver
//!
//! Loads a structured syscall description, lowers it for a target and
//! reports the result.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use sysdesc_cli::commands;

#[derive(Parser)]
#[command(name = "sysdesc")]
#[command(about = "Syscall description lowering", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lower a description and print a summary of the IR
    Lower {
        /// Description file (.json or .toml)
        file: PathBuf,
        /// Target config (target.toml); defaults to linux/amd64
        #[arg(short, long)]
        target: Option<PathBuf>,
        /// Print the full IR instead of a summary
        #[arg(long)]
        dump: bool,
    },

    /// Lower a description and only report whether it succeeded
    Check {
        /// Description file (.json or .toml)
        file: PathBuf,
        /// Target config (target.toml); defaults to linux/amd64
        #[arg(short, long)]
        target: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Lower { file, target, dump } => {
            commands::lower::execute(&file, target.as_deref(), dump)
        }
        Commands::Check { file, target } => {
            if let Err(e) = commands::check::execute(&file, target.as_deref()) {
                eprintln!("Error: {:#}", e);
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
