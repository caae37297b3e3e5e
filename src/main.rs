//! Recommendation engine CLI entry point.

use assessrec::cli::{commands, Cli, Commands};
use assessrec::error::Error;
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    // JSON output when asked for, or when piped into another program.
    let json = cli.json || !std::io::IsTerminal::is_terminal(&std::io::stdout());

    match run(&cli, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use the verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("assessrec=info"),
            2 => EnvFilter::new("assessrec=debug"),
            _ => EnvFilter::new("assessrec=trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    match &cli.command {
        Commands::Init { force } => commands::init::execute(cli.db.as_ref(), *force, json),

        Commands::Load { csv } => commands::load::execute(cli.db.as_ref(), csv, json),

        Commands::Embed { force, batch_size } => {
            commands::embed::execute(cli.db.as_ref(), *force, *batch_size, json)
        }

        Commands::Recommend(args) => commands::recommend::execute(cli.db.as_ref(), args, json),

        Commands::Catalog { command } => {
            commands::catalog::execute(command, cli.db.as_ref(), json)
        }

        Commands::Evaluate { command } => {
            commands::evaluate::execute(command, cli.db.as_ref(), cli.data_dir.as_ref(), json)
        }

        Commands::Completions { shell } => commands::completions::execute(*shell),
    }
}
