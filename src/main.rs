use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};

use saju_match::config::Config;
use saju_match::predictor::PredictorRegistry;
use saju_match::protocol::{self, PairingResponse};
use saju_match::scoring::{CompatibilityEngine, RuleSet};

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score a pairing: JSON in, JSON out (default if no subcommand)
    Score {
        /// Read the request from this file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Print a human-readable breakdown of a pairing
    Explain {
        /// Read the request from this file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Write the default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Load both affinity models and print their status
    Models,
}

#[derive(Parser, Debug)]
#[command(name = "saju-match")]
#[command(about = "Four Pillars compatibility scoring", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/saju-match/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p)
            .with_context(|| format!("Failed to read input from {}", p.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read input from stdin")?;
            Ok(buf)
        }
    }
}

/// Load and validate the config, collecting every problem.
fn load_validated_config(path: Option<PathBuf>) -> Result<Config, Vec<String>> {
    let config = saju_match::config::load_config(path).map_err(|e| vec![format!("{:#}", e)])?;
    saju_match::config::validate_config(&config)?;
    Ok(config)
}

const INTERNAL_ERROR_PAYLOAD: &str =
    r#"{"success":false,"error":"internal error","score":0,"sal0":[],"sal1":[]}"#;

fn print_response(response: &PairingResponse) {
    match response.to_json() {
        Ok(line) => println!("{}", line),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize response");
            println!("{}", INTERNAL_ERROR_PAYLOAD);
        }
    }
}

/// Report config errors and exit. `score` callers still get a failure payload.
fn exit_config_error(command: &Commands, errors: &[String]) -> ! {
    eprintln!("Config errors:");
    for error in errors {
        eprintln!("  - {}", error);
    }
    if matches!(command, Commands::Score { .. }) {
        print_response(&PairingResponse::config_error(errors));
    }
    std::process::exit(EXIT_CONFIG);
}

fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Score { input: None });

    // init writes the config, so it must not require a valid one
    if let Commands::Init { force } = command {
        if let Err(e) = saju_match::telemetry::init(None, cli.verbose) {
            eprintln!("Logging setup failed: {}", e);
        }
        match saju_match::config::write_default_config(cli.config, force) {
            Ok(path) => {
                println!("Wrote default config to {}", path.display());
                std::process::exit(EXIT_SUCCESS);
            }
            Err(e) => {
                eprintln!("Config error: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
    }

    let config = match load_validated_config(cli.config) {
        Ok(c) => c,
        Err(errors) => exit_config_error(&command, &errors),
    };

    if let Err(e) = saju_match::telemetry::init(config.log_level.as_deref(), cli.verbose) {
        exit_config_error(&command, &[e.to_string()]);
    }

    let registry = PredictorRegistry::global(&config.models);
    let engine = CompatibilityEngine::new(registry, RuleSet::standard(&config.penalties));

    match command {
        Commands::Score { input } => {
            let response = match read_input(input.as_deref()) {
                Ok(text) => protocol::handle(&engine, &text),
                Err(e) => PairingResponse::failure(format!("{:#}", e)),
            };
            print_response(&response);
        }
        Commands::Explain { input } => {
            let text = match read_input(input.as_deref()) {
                Ok(t) => t,
                Err(e) => {
                    eprintln!("Input error: {:#}", e);
                    std::process::exit(EXIT_INPUT);
                }
            };
            let request = match protocol::parse_request(&text) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("Input error: {}", e);
                    std::process::exit(EXIT_INPUT);
                }
            };
            let result = engine.score(&request);
            let use_colors = saju_match::output::should_use_colors();
            println!(
                "{}",
                saju_match::output::format_report(&request, &result, use_colors)
            );
        }
        Commands::Models => {
            registry.warm_up();
            let use_colors = saju_match::output::should_use_colors();
            println!(
                "{}",
                saju_match::output::format_status(registry, use_colors)
            );
        }
        Commands::Init { .. } => {}
    }

    std::process::exit(EXIT_SUCCESS);
}
