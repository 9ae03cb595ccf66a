//! gencode CLI - evolve C-like programs against a real compiler.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use std::num::NonZeroUsize;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// gencode - grammar-guided genetic programming scored by compiler diagnostics
#[derive(Parser, Debug)]
#[command(name = "gencode")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Evolve a population of programs
    Evolve(cli::evolve::EvolveArgs),

    /// Print one random program
    Generate {
        /// Number of statements (default: 1)
        #[arg(default_value = "1")]
        statements: NonZeroUsize,

        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "gencode=info",
        1 => "gencode=debug",
        _ => "gencode=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let error = cli::CliError::from(e);
            eprint!("{error}");
            return ExitCode::from(error.exit_code());
        }
    };
    init_tracing(args.verbose);

    let result = match args.command {
        Commands::Evolve(evolve) => cli::evolve::execute(&evolve),
        Commands::Generate { statements, seed } => cli::generate::execute(statements, seed),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
