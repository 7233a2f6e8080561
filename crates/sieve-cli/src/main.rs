//! # sieve CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use std::process::ExitCode;

use clap::Parser;

/// Sieve — declarative validation and transformation.
///
/// Checks YAML or JSON input documents against schema documents and
/// describes what a schema does.
#[derive(Parser, Debug)]
#[command(name = "sieve", version, about)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG`
    /// takes precedence when set.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Validate and transform an input document.
    Check(sieve_cli::check::CheckArgs),
    /// Print the fields and pipeline steps of a schema.
    Describe(sieve_cli::describe::DescribeArgs),
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check(args) => {
            let outcome = sieve_cli::check::run_check(&args)?;
            print!("{}", outcome.output);
            Ok(if outcome.valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
        Commands::Describe(args) => {
            print!("{}", sieve_cli::describe::run_describe(&args)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
