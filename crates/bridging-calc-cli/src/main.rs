mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::bridging::{CalculateArgs, ValidateArgs};

/// Bridging finance calculations
#[derive(Parser)]
#[command(
    name = "brc",
    version,
    about = "Bridging finance calculations with decimal precision",
    long_about = "A CLI for assessing property bridging finance: peak and end debt, \
                  capitalised fees and interest, LVR caps, and funding shortfalls, \
                  computed with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a bridging calculation
    Calculate(CalculateArgs),
    /// Range-check an input record without calculating
    Validate(ValidateArgs),
    /// Print the default inputs and solver configuration
    Defaults,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Calculate(args) => commands::bridging::run_calculate(args),
        Commands::Validate(args) => commands::bridging::run_validate(args),
        Commands::Defaults => commands::bridging::run_defaults(),
        Commands::Version => {
            println!("brc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
