//! Mapping from the persisted configuration to renderer inputs.

use foamline_config::{CameraConfig, Config, DepthPacking, FogConfig, WaterConfig};
use foamline_render::{
    Camera, DepthPreference, FlowSettings, FogUniform, RendererSettings, WaterParams,
    srgb_hex_to_linear,
};
use glam::Vec3;
use tracing::warn;

pub fn depth_preference(packing: DepthPacking) -> DepthPreference {
    match packing {
        DepthPacking::Auto => DepthPreference::Auto,
        DepthPacking::Packed => DepthPreference::Packed,
    }
}

/// Live water parameters. The threshold is clamped into `[0.1, 1]`.
pub fn water_params(water: &WaterConfig) -> WaterParams {
    WaterParams::from_hex(water.foam_color, water.water_color, water.threshold)
}

pub fn flow_settings(water: &WaterConfig) -> FlowSettings {
    FlowSettings {
        distortion_strength: water.distortion_strength,
        flow_speed: water.flow_speed,
    }
}

pub fn fog_uniform(fog: &FogConfig) -> FogUniform {
    FogUniform::new(fog.enabled, srgb_hex_to_linear(fog.color), fog.near, fog.far)
}

/// Build the camera, replacing unusable clip planes with the defaults.
pub fn camera(config: &CameraConfig) -> Camera {
    let (mut near, mut far) = (config.near, config.far);
    if !(near > 0.0 && far > near) {
        let fallback = CameraConfig::default();
        warn!(
            "Invalid camera clip planes near={} far={}, using {} and {}",
            near, far, fallback.near, fallback.far
        );
        near = fallback.near;
        far = fallback.far;
    }
    Camera::new(
        Vec3::from_array(config.position),
        Vec3::from_array(config.target),
        config.fov_y_degrees,
        near,
        far,
    )
}

pub fn renderer_settings(config: &Config) -> RendererSettings {
    RendererSettings {
        depth_preference: depth_preference(config.render.depth_packing),
        camera: camera(&config.camera),
        fog: fog_uniform(&config.fog),
        background: config.render.background_color,
        flow: flow_settings(&config.water),
        flow_texture: config.water.flow_texture.clone(),
    }
}
