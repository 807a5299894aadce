//! JobTrack CLI - Companion for the JobTrack job-application tracking API

use clap::{CommandFactory, Parser};

mod cli;
mod client;
mod config;
mod error;
mod models;
mod output;
mod session;

use cli::args::GlobalOptions;
use cli::{Cli, CommandContext, Commands};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let opts = GlobalOptions::from_cli(&cli);
    match cli.command {
        Commands::Version => {
            println!("jobtrack version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "jobtrack", &mut std::io::stdout());
            Ok(())
        }
        Commands::Shell => {
            let ctx = CommandContext::new(&opts)?;
            cli::shell::run(&ctx).await
        }
        command => {
            let ctx = CommandContext::new(&opts)?;
            cli::dispatch(&ctx, command).await
        }
    }
}

/// `RUST_LOG` wins; otherwise warnings, or debug with `--debug`
fn init_logging(debug: bool) {
    let default_level = if debug { "jobtrack=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
    log::debug!("Debug logging enabled");
}
