//! Foamline binary: stylized water with shoreline foam.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p foamline-app -- --threshold 0.4 --depth-packing packed`.

use std::path::PathBuf;

use clap::Parser;
use foamline_app::{LiveParams, run};
use foamline_config::{CliArgs, Config};
use tracing::{error, info};

fn main() {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(|| {
        dirs::config_dir()
            .map(|dir| dir.join("foamline"))
            .unwrap_or_else(|| PathBuf::from("."))
    });

    // The file config is kept separately so live reloads can re-apply CLI overrides
    let file_config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    let params = LiveParams::new(config_dir.clone(), file_config, args);

    let log_dir = config_dir.join("logs");
    foamline_log::init_logging(
        Some(&log_dir),
        cfg!(debug_assertions),
        Some(params.config()),
    );
    info!("Using config directory {}", config_dir.display());

    if let Err(e) = run(params) {
        error!("Event loop failed: {e}");
        std::process::exit(1);
    }
}
