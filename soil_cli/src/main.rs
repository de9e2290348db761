//! # Substrata CLI
//!
//! Runs one JSON analysis request through `soil_core` and prints a short
//! summary followed by the JSON result.
//!
//! ```text
//! soil_cli request.json
//! cat request.json | soil_cli - --compact
//! RUST_LOG=debug soil_cli request.json
//! ```

use std::error::Error;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::debug;
use soil_core::AnalysisRequest;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Analysis request file, or `-` to read from stdin
    request: PathBuf,
    /// Print the result JSON on a single line
    #[clap(long, action)]
    compact: bool,
}

fn read_request(path: &PathBuf) -> Result<String, Box<dyn Error>> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        return Ok(buffer);
    }
    Ok(std::fs::read_to_string(path)?)
}

fn entrypoint() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let raw = read_request(&cli.request)?;
    let request: AnalysisRequest = serde_json::from_str(&raw)?;
    debug!("parsed {} request '{}'", request.analysis_type(), request.label());

    let output = request.run()?;
    let label = match request.label() {
        "" => request.analysis_type(),
        label => label,
    };
    println!("{}: {}", label, output.summary());

    let json = if cli.compact {
        serde_json::to_string(&output)?
    } else {
        serde_json::to_string_pretty(&output)?
    };
    println!("{}", json);
    Ok(())
}

fn main() -> ExitCode {
    match entrypoint() {
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}
