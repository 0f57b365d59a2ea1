//! rafsim generation CLI
//!
//! Reads one JSON generation request and writes one JSON response.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rafsim::request::from_json;
use rafsim::{Config, ErrorDetail, SimEngine, SimError, SimulatorRegistry};

/// CLI options.
#[derive(Default)]
struct Options {
    /// Request file; stdin when absent.
    request: Option<PathBuf>,
    /// Response file; stdout when absent.
    output: Option<PathBuf>,
    /// Configuration file.
    config: Option<PathBuf>,
    /// Print registered simulators and exit.
    list: bool,
}

fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let mut options = Options::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            flag @ ("--request" | "-r" | "--output" | "-o" | "--config" | "-c") => {
                let Some(value) = args.get(i + 1) else {
                    eprintln!("error: {flag} requires a value");
                    std::process::exit(2);
                };
                let path = Some(PathBuf::from(value));
                match flag {
                    "--request" | "-r" => options.request = path,
                    "--output" | "-o" => options.output = path,
                    _ => options.config = path,
                }
                i += 2;
            }
            "--list" | "-l" => {
                options.list = true;
                i += 1;
            }
            "--help" | "-h" => {
                println!("rafsim-generate - run one RAF simulation request");
                println!();
                println!("USAGE:");
                println!("    rafsim-generate [OPTIONS]");
                println!();
                println!("OPTIONS:");
                println!("    -r, --request <FILE>      Request JSON [default: stdin]");
                println!("    -o, --output <FILE>       Response JSON [default: stdout]");
                println!("    -c, --config <FILE>       Engine configuration JSON");
                println!("    -l, --list                List registered simulators");
                println!("    -h, --help                Print help information");
                println!();
                println!("Log level is read from RAFSIM_LOG [default: info].");
                std::process::exit(0);
            }
            arg => {
                eprintln!("error: unknown argument: {arg}");
                std::process::exit(2);
            }
        }
    }

    options
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("RAFSIM_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(options: &Options) -> Result<(), SimError> {
    let config = match &options.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let engine = SimEngine::new(Arc::new(SimulatorRegistry::builtin()), config.engine)?;

    let output = if options.list {
        serde_json::to_string_pretty(&engine.list())
            .map_err(|e| SimError::internal(format!("serialize simulator list: {e}")))?
    } else {
        let text = match &options.request {
            Some(path) => fs::read_to_string(path)
                .map_err(|e| SimError::internal(format!("read {}: {e}", path.display())))?,
            None => {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .map_err(|e| SimError::internal(format!("read stdin: {e}")))?;
                buf
            }
        };
        let request = from_json(&text)?;
        info!(request_id = %request.request_id, simulator = %request.simulator_id, "request received");
        engine.generate(&request)?.to_json_pretty()?
    };

    match &options.output {
        Some(path) => fs::write(path, output)
            .map_err(|e| SimError::internal(format!("write {}: {e}", path.display()))),
        None => writeln!(io::stdout(), "{output}").map_err(|e| SimError::internal(format!("write stdout: {e}"))),
    }
}

fn main() -> ExitCode {
    init_tracing();
    let options = parse_args();

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(kind = err.kind(), "{err}");
            let detail = ErrorDetail::from(&err);
            match serde_json::to_string_pretty(&detail) {
                Ok(json) => eprintln!("{json}"),
                Err(_) => eprintln!("error: {err}"),
            }
            ExitCode::FAILURE
        }
    }
}
