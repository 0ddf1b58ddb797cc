//! The `minic` command-line interface.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use minic_drv::{compile, EXAMPLE_SOURCE};

/// minic - a five-stage compiler for a small C-like language
///
/// Compiles a source file through scanning, parsing, semantic analysis,
/// TAC generation, and assembly generation, printing each stage's artifact
/// along the way.
#[derive(Parser, Debug)]
#[command(name = "minic")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A five-stage compiler for a small C-like language", long_about = None)]
struct Cli {
    /// Input source file
    input: Option<PathBuf>,

    /// Suppress per-stage printing
    #[arg(short, long)]
    quiet: bool,

    /// Compile the built-in factorial example
    #[arg(short, long)]
    example: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<bool> {
    let source = match (&cli.input, cli.example) {
        (Some(path), false) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display()))?,
        _ => EXAMPLE_SOURCE.to_string(),
    };

    Ok(compile(&source, !cli.quiet))
}
