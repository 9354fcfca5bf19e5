//! Pipeline entry point: CLI wiring and config-driven execution.

use std::path::PathBuf;
use std::process;

use tracing_subscriber::EnvFilter;

use load_dispatch::config::DispatchConfig;
use load_dispatch::io::export::export_csv;
use load_dispatch::pipeline;

/// Parsed CLI arguments.
struct CliArgs {
    config_path: Option<PathBuf>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
}

fn print_help() {
    eprintln!("load-dispatch: least-cost hourly dispatch of a cleaned load series");
    eprintln!();
    eprintln!("Usage: load-dispatch [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>   Load pipeline configuration from TOML file");
    eprintln!("  --input <path>    Override the input CSV location");
    eprintln!("  --output <path>   Override the output CSV location");
    eprintln!("  --help            Show this help message");
    eprintln!();
    eprintln!("Without --config, the baseline configuration is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        config_path: None,
        input: None,
        output: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --config requires a path argument");
                    process::exit(1);
                }
                cli.config_path = Some(PathBuf::from(&args[i]));
            }
            "--input" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --input requires a path argument");
                    process::exit(1);
                }
                cli.input = Some(PathBuf::from(&args[i]));
            }
            "--output" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --output requires a path argument");
                    process::exit(1);
                }
                cli.output = Some(PathBuf::from(&args[i]));
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("load_dispatch=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = parse_args();

    // Load config, then apply CLI path overrides.
    let mut config = if let Some(ref path) = cli.config_path {
        match DispatchConfig::from_toml_file(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        DispatchConfig::baseline()
    };
    if let Some(input) = cli.input {
        config.input = input;
    }
    if let Some(output) = cli.output {
        config.output = output;
    }

    // Validate
    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // Stage 1: load and normalize.
    let demand = match pipeline::prepare_series(&config) {
        Ok(series) => series,
        Err(e) => {
            eprintln!("error: failed to prepare load series: {e}");
            process::exit(1);
        }
    };

    // Stage 2: build and solve.
    let result = match pipeline::dispatch(&config, demand) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("error: optimisation failed: {e}");
            process::exit(1);
        }
    };

    // Stage 3: export.
    if let Err(e) = export_csv(&result, &config.output) {
        eprintln!("error: failed to write results: {e}");
        process::exit(1);
    }

    eprintln!(
        "Results written to {} ({} rows, solver: {})",
        config.output.display(),
        result.len(),
        result.solver_id()
    );
}
