//! vadrec Command-Line Interface
//!
//! A thin client for the vadrec service: checks status, starts and stops
//! voice detection, and inspects options over the local HTTP control plane.

mod client;
mod colors;
mod commands;
mod exit_codes;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use exit_codes::ExitCode;

/// vadrec - Voice Activity Detection CLI
#[derive(Parser, Debug)]
#[command(name = "vadrec")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format for scripting
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show current detection status
    Status,
    /// Start voice detection, optionally overriding options
    Start {
        /// Option overrides as key=value (e.g. speechThreshold=0.4)
        #[arg(value_name = "KEY=VALUE")]
        overrides: Vec<String>,
    },
    /// Stop voice detection and flush the current segment
    Stop,
    /// Show the options currently in effect
    Options,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // help and version are successful outcomes; anything else
            // (unknown command, bad flags) exits 1
            let code = match err.kind() {
                ErrorKind::DisplayHelp
                | ErrorKind::DisplayVersion
                | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => ExitCode::Success,
                _ => ExitCode::GeneralError,
            };
            let _ = err.print();
            std::process::exit(code.as_i32());
        }
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create Tokio runtime");

    let exit_code = runtime.block_on(run(cli));
    std::process::exit(exit_code.as_i32());
}

async fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Commands::Status => commands::status(cli.json).await,
        Commands::Start { overrides } => commands::start(&overrides, cli.json, cli.quiet).await,
        Commands::Stop => commands::stop(cli.json, cli.quiet).await,
        Commands::Options => commands::options(cli.json).await,
    }
}
