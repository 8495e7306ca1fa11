//! Command-line front end.
//!
//! ```text
//! enigma [--verbose] CONFIG [INPUT [OUTPUT]]
//! ```
//!
//! Reads the machine description from CONFIG, then settings lines and
//! messages from INPUT (stdin by default), and writes the converted
//! messages to OUTPUT (stdout by default).

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use enigma::config::MachineConfig;
use enigma::session::Session;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "enigma", version, about = "Rotor cipher machine simulator")]
struct Cli {
    /// Print every keypress through the machine on stderr.
    #[arg(long)]
    verbose: bool,

    /// Machine configuration file.
    config: PathBuf,

    /// Messages and settings lines; stdin when omitted.
    input: Option<PathBuf>,

    /// Destination for converted messages; stdout when omitted.
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let text = std::fs::read_to_string(&cli.config)
        .with_context(|| format!("could not open {}", cli.config.display()))?;
    let machine = MachineConfig::parse(&text)?.build()?;
    tracing::info!(config = %cli.config.display(), "loaded machine configuration");

    let input: Box<dyn io::BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("could not open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let mut output: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("could not open {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    let mut stderr = io::stderr().lock();
    let trace: Option<&mut dyn Write> = if cli.verbose {
        Some(&mut stderr)
    } else {
        None
    };

    Session::new(machine).run(input, &mut output, trace)?;
    Ok(())
}
