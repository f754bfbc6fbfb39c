//! # td-generator entry point
//!
//! Parses the command line and dispatches to the subcommand handlers.

use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use td_generator::{
    cli::{run_create, run_validate, ValidateArgs},
    prompt,
};

/// CLI tool to generate Thing Description (TD) files for Web of Things
#[derive(Parser, Debug)]
#[command(name = "td-generator", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new Thing Description file
    Create,

    /// Validate a Thing Description file
    Validate(ValidateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command else {
        if let Err(e) = Cli::command().print_help() {
            eprintln!("❌ Error: {e}");
            return ExitCode::FAILURE;
        }
        return ExitCode::SUCCESS;
    };

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            eprintln!("❌ Error: cannot resolve the current directory: {e}");
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(cwd = %cwd.display(), "starting");

    match command {
        Commands::Create => match run_create(&cwd) {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                match e.downcast_ref::<prompt::Error>() {
                    Some(prompt::Error::NonInteractive) => eprintln!("❌ {e}"),
                    _ => eprintln!("❌ Error: {e:#}"),
                }
                ExitCode::FAILURE
            }
        },
        Commands::Validate(args) => match run_validate(&args, &cwd) {
            Ok(summary) => {
                if !summary.wot_context {
                    eprintln!("⚠️  Warning: @context should include W3C WoT TD context URL.");
                }
                println!("✅ Thing Description is valid!\n");
                println!("{summary}\n");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ {e}");
                ExitCode::FAILURE
            }
        },
    }
}
