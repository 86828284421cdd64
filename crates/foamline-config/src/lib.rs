//! Configuration system for Foamline.
//!
//! Settings persist to disk as a RON file, can be overridden from the command
//! line via clap, and are polled for changes while the app runs so the water
//! parameters can be edited live.

mod cli;
mod config;
mod error;

pub use cli::{CliArgs, DepthPackingArg};
pub use config::{
    CONFIG_FILE_NAME, CameraConfig, Config, DebugConfig, DepthPacking, FogConfig, RenderConfig,
    WaterConfig, WindowConfig,
};
pub use error::ConfigError;
