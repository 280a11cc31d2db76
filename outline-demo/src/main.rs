mod config;
mod paths;
mod session;

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use log::{error, info};
use simplelog::{Config, LevelFilter, WriteLogger};

const USAGE: &str = "usage: outline-demo [--config <path>] [--verbose | --quiet]";

struct Args {
    config: Option<PathBuf>,
    level: Option<LevelFilter>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        config: None,
        level: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().ok_or("--config needs a path")?;
                args.config = Some(PathBuf::from(path));
            }
            "--verbose" => args.level = Some(LevelFilter::Trace),
            "--quiet" => args.level = Some(LevelFilter::Warn),
            "--help" | "-h" => return Err(USAGE.to_string()),
            other => return Err(format!("unknown argument {other}\n{USAGE}")),
        }
    }
    Ok(args)
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    let config = match config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let level = match args.level.map_or_else(|| config.level(), Ok) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let log_path = paths::prepare_log_file();
    match File::create(&log_path) {
        Ok(file) => {
            if let Err(e) = WriteLogger::init(level, Config::default(), file) {
                eprintln!("Logging disabled: {}", e);
            }
        }
        Err(e) => eprintln!("Logging disabled, cannot create {}: {}", log_path.display(), e),
    }
    info!("outline-demo starting with {:?}", config);

    let summary = match session::run(&config) {
        Ok(summary) => summary,
        Err(e) => {
            error!("session failed: {}", e);
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    }
    info!("outline-demo finished");
    ExitCode::SUCCESS
}
