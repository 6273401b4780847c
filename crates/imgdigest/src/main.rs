//! imgdigest CLI - resolve image tags to manifest digests
//!
//! This is the main entry point for the imgdigest command-line interface.

mod cli;
mod commands;
mod output;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    // This must be done before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Resolve(args) => commands::resolve::run(args).await,
        Commands::Parse(args) => commands::parse::run(args),
        Commands::Version(args) => commands::version::run(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&error_message(&e));
            ExitCode::FAILURE
        }
    }
}

/// One-line rendering of an error and its causes
fn error_message(err: &anyhow::Error) -> String {
    format!("{:#}", err)
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            // Default stays quiet enough for the digest to be piped
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
