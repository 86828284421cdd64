//! Foamline application: window, event handling and the frame loop.

pub mod params;
pub mod scene_setup;
pub mod settings;
pub mod window;

pub use params::LiveParams;
pub use window::{App, run};
