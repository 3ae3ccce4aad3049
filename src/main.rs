//! Stack & Conquer CLI - check CPU scripts and run single CPU turns.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Stack & Conquer - scripted CPU opponents
#[derive(Parser, Debug)]
#[command(name = "stackconquer")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging (includes script log output)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Load CPU scripts and check the move contract
    Validate {
        /// CPU script files
        #[arg(required = true, num_args = 1..)]
        scripts: Vec<PathBuf>,

        #[command(flatten)]
        env: cli::ConfigArgs,
    },

    /// Ask a CPU script for one move
    Turn {
        /// CPU script file
        #[arg(required = true)]
        script: PathBuf,

        /// Board file (JSON array of cells, default: empty board)
        #[arg(short, long)]
        board: Option<PathBuf>,

        /// Number of possible moves passed to the script (default: empty fields)
        #[arg(short, long)]
        moves: Option<usize>,

        #[command(flatten)]
        env: cli::ConfigArgs,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    let result = match args.command {
        Commands::Validate { scripts, env } => {
            env.resolve().and_then(|config| cli::validate::execute(&scripts, &config))
        }

        Commands::Turn {
            script,
            board,
            moves,
            env,
            format,
        } => env
            .resolve()
            .and_then(|config| cli::turn::execute(&script, board, moves, config, format)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
