//! Live parameter surface backed by `config.ron`.
//!
//! The water parameters are pulled once per frame by the scheduler and are
//! always served from memory. The window loop calls [`LiveParams::poll`]
//! between frames; at most once per [`RELOAD_INTERVAL`] that re-reads the
//! config file, so a hand edit shows up on the next frame without a restart.
//!
//! Only the foam and water colors, the foam threshold and the fog section are
//! live. Flow speed, distortion strength and the flow texture are baked into
//! the renderer at startup; edits to them are reported and otherwise ignored
//! until the next launch.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use foamline_config::{CliArgs, Config};
use foamline_render::{FogUniform, ParameterSource, WaterParams};
use tracing::{info, warn};

use crate::settings::{fog_uniform, water_params};

/// Minimum time between config file reads.
pub const RELOAD_INTERVAL: Duration = Duration::from_secs(1);

pub struct LiveParams {
    config_dir: PathBuf,
    /// Last config read from disk, before CLI overrides.
    file_config: Config,
    /// Re-applied on every reload so command-line values keep winning.
    overrides: CliArgs,
    effective: Config,
    params: WaterParams,
    pending_fog: Option<FogUniform>,
    interval: Duration,
    last_poll: Instant,
}

impl LiveParams {
    pub fn new(config_dir: PathBuf, file_config: Config, overrides: CliArgs) -> Self {
        let mut effective = file_config.clone();
        effective.apply_cli_overrides(&overrides);
        let params = water_params(&effective.water);
        Self {
            config_dir,
            file_config,
            overrides,
            effective,
            params,
            pending_fog: None,
            interval: RELOAD_INTERVAL,
            last_poll: Instant::now(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Effective configuration (file plus CLI overrides).
    pub fn config(&self) -> &Config {
        &self.effective
    }

    /// Re-read the config file if the reload interval has elapsed.
    ///
    /// Returns `true` when the effective configuration changed. Read and parse
    /// failures keep the previous values.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_poll) < self.interval {
            return false;
        }
        self.last_poll = now;

        let reloaded = match self.file_config.reload(&self.config_dir) {
            Ok(Some(config)) => config,
            Ok(None) => return false,
            Err(e) => {
                warn!("Config reload failed, keeping previous values: {e}");
                return false;
            }
        };

        let mut effective = reloaded.clone();
        effective.apply_cli_overrides(&self.overrides);
        self.file_config = reloaded;

        if startup_only_changed(&self.effective, &effective) {
            warn!("Flow settings changed in config; they take effect after a restart");
        }

        if effective.fog != self.effective.fog {
            self.pending_fog = Some(fog_uniform(&effective.fog));
        }
        let params = water_params(&effective.water);
        if params != self.params {
            info!(
                "Water parameters updated: threshold {:.2}, foam #{:06x}, water #{:06x}",
                params.threshold, effective.water.foam_color, effective.water.water_color
            );
        }
        self.params = params;
        self.effective = effective;
        true
    }

    /// Fog uniform to upload, if the fog section changed since the last call.
    pub fn take_fog_change(&mut self) -> Option<FogUniform> {
        self.pending_fog.take()
    }
}

/// Whether any water setting the renderer only reads at startup differs.
fn startup_only_changed(old: &Config, new: &Config) -> bool {
    old.water.flow_speed != new.water.flow_speed
        || old.water.distortion_strength != new.water.distortion_strength
        || old.water.flow_texture != new.water.flow_texture
}

impl ParameterSource for LiveParams {
    fn current(&mut self) -> WaterParams {
        self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_params(dir: &std::path::Path, config: Config, overrides: CliArgs) -> LiveParams {
        config.save(dir).unwrap();
        LiveParams::new(dir.to_path_buf(), config, overrides).with_interval(Duration::ZERO)
    }

    #[test]
    fn test_initial_params_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut params = live_params(dir.path(), Config::default(), CliArgs::default());
        assert_eq!(params.current(), WaterParams::default());
        assert!(params.take_fog_change().is_none());
    }

    #[test]
    fn test_file_edit_is_picked_up() {
        let dir = tempfile::tempdir().unwrap();
        let mut params = live_params(dir.path(), Config::default(), CliArgs::default());

        let mut edited = Config::default();
        edited.water.threshold = 0.6;
        edited.save(dir.path()).unwrap();

        assert!(params.poll(Instant::now()));
        assert_eq!(params.current().threshold, 0.6);
        assert_eq!(params.config().water.threshold, 0.6);
    }

    #[test]
    fn test_cli_overrides_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = CliArgs {
            threshold: Some(0.3),
            ..CliArgs::default()
        };
        let mut params = live_params(dir.path(), Config::default(), overrides);
        assert_eq!(params.current().threshold, 0.3);

        let mut edited = Config::default();
        edited.water.foam_color = 0x000000;
        edited.save(dir.path()).unwrap();

        params.poll(Instant::now());
        let current = params.current();
        assert_eq!(current.threshold, 0.3);
        assert_eq!(current.foam_color, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_fog_change_is_reported_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut params = live_params(dir.path(), Config::default(), CliArgs::default());

        let mut edited = Config::default();
        edited.fog.enabled = true;
        edited.save(dir.path()).unwrap();

        assert!(params.poll(Instant::now()));
        let fog = params.take_fog_change().unwrap();
        assert_eq!(fog.color[3], 1.0);
        assert!(params.take_fog_change().is_none());
    }

    #[test]
    fn test_invalid_file_keeps_previous_values() {
        let dir = tempfile::tempdir().unwrap();
        let mut params = live_params(dir.path(), Config::default(), CliArgs::default());

        std::fs::write(
            dir.path().join(foamline_config::CONFIG_FILE_NAME),
            "{{not valid}}",
        )
        .unwrap();

        assert!(!params.poll(Instant::now()));
        assert_eq!(params.current(), WaterParams::default());
    }

    #[test]
    fn test_poll_respects_interval() {
        let dir = tempfile::tempdir().unwrap();
        Config::default().save(dir.path()).unwrap();
        let mut params = LiveParams::new(
            dir.path().to_path_buf(),
            Config::default(),
            CliArgs::default(),
        )
        .with_interval(Duration::from_secs(3600));

        let mut edited = Config::default();
        edited.water.threshold = 0.9;
        edited.save(dir.path()).unwrap();

        assert!(!params.poll(Instant::now()));
        assert_eq!(params.current().threshold, 0.1);
    }

    #[test]
    fn test_current_never_touches_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut params = live_params(dir.path(), Config::default(), CliArgs::default());

        let mut edited = Config::default();
        edited.water.threshold = 0.7;
        edited.save(dir.path()).unwrap();

        // Pulled mid-frame: still the cached value even with a zero interval.
        assert_eq!(params.current().threshold, 0.1);
        assert_eq!(params.current().threshold, 0.1);
        assert!(params.poll(Instant::now()));
        assert_eq!(params.current().threshold, 0.7);
    }

    #[test]
    fn test_flow_edits_are_startup_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut params = live_params(dir.path(), Config::default(), CliArgs::default());
        let before = params.current();

        let mut edited = Config::default();
        edited.water.flow_speed = 0.5;
        edited.water.distortion_strength = 0.2;
        assert!(startup_only_changed(&Config::default(), &edited));
        edited.save(dir.path()).unwrap();

        params.poll(Instant::now());
        assert_eq!(params.current(), before);
        assert!(params.take_fog_change().is_none());
    }

    #[test]
    fn test_live_edits_are_not_startup_only() {
        let mut edited = Config::default();
        edited.water.threshold = 0.4;
        edited.water.foam_color = 0x123456;
        edited.fog.enabled = true;
        assert!(!startup_only_changed(&Config::default(), &edited));
    }
}
