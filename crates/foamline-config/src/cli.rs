//! Command-line argument parsing for Foamline.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::{Config, DepthPacking};

/// Depth packing policy as accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DepthPackingArg {
    /// Use the hardware depth texture when available.
    Auto,
    /// Force the packed color-buffer path.
    Packed,
}

impl From<DepthPackingArg> for DepthPacking {
    fn from(arg: DepthPackingArg) -> Self {
        match arg {
            DepthPackingArg::Auto => DepthPacking::Auto,
            DepthPackingArg::Packed => DepthPacking::Packed,
        }
    }
}

/// Foamline command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "foamline", about = "Stylized water with depth-based shoreline foam")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Foam threshold (0.1 - 1.0).
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Foam color as hex, e.g. `ffffff` or `0xffffff`.
    #[arg(long, value_parser = parse_hex_color)]
    pub foam_color: Option<u32>,

    /// Water color as hex, e.g. `14c6a5`.
    #[arg(long, value_parser = parse_hex_color)]
    pub water_color: Option<u32>,

    /// Depth source policy.
    #[arg(long, value_enum)]
    pub depth_packing: Option<DepthPackingArg>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Parse a `RRGGBB` color with an optional `0x` or `#` prefix.
pub fn parse_hex_color(s: &str) -> Result<u32, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix('#'))
        .unwrap_or(s);
    if digits.len() != 6 {
        return Err(format!("expected 6 hex digits, got '{s}'"));
    }
    u32::from_str_radix(digits, 16).map_err(|e| format!("invalid hex color '{s}': {e}"))
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(t) = args.threshold {
            self.water.threshold = t;
        }
        if let Some(c) = args.foam_color {
            self.water.foam_color = c;
        }
        if let Some(c) = args.water_color {
            self.water.water_color = c;
        }
        if let Some(packing) = args.depth_packing {
            self.render.depth_packing = packing.into();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
