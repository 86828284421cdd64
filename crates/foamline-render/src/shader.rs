//! WGSL composition and the compiled shader module cache.
//!
//! WGSL has no include mechanism, so each program is assembled from the
//! fragments under `shaders/`. Module-scope declarations in WGSL are
//! order-independent, which lets the water variants swap their prelude
//! without touching the shared body.

use log::{debug, info};
use std::{collections::HashMap, sync::Arc};
use wgpu::{ShaderModuleDescriptor, ShaderSource};

use crate::depth::DepthMode;

pub const COMMON_WGSL: &str = include_str!("shaders/common.wgsl");
pub const OBJECT_WGSL: &str = include_str!("shaders/object.wgsl");
pub const PACKING_WGSL: &str = include_str!("shaders/packing.wgsl");
pub const SCENE_WGSL: &str = include_str!("shaders/scene.wgsl");
pub const DEPTH_ENCODER_WGSL: &str = include_str!("shaders/depth_encoder.wgsl");
pub const WATER_WGSL: &str = include_str!("shaders/water.wgsl");

/// Name under which the lit scene program is cached.
pub const SCENE_SHADER: &str = "scene";
/// Name under which the depth encoder program is cached.
pub const DEPTH_ENCODER_SHADER: &str = "depth-encoder";

/// Concatenate WGSL fragments into one program.
pub fn compose(parts: &[&str]) -> String {
    parts.join("\n")
}

/// Lambert-lit scene geometry.
pub fn scene_shader_source() -> String {
    compose(&[COMMON_WGSL, OBJECT_WGSL, SCENE_WGSL])
}

/// Override material for the depth pass.
pub fn depth_encoder_shader_source() -> String {
    compose(&[COMMON_WGSL, OBJECT_WGSL, PACKING_WGSL, DEPTH_ENCODER_WGSL])
}

/// One self-contained water program, specialised for a [`DepthMode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaterShaderVariant {
    mode: DepthMode,
}

impl WaterShaderVariant {
    /// Camera projection the variant reconstructs depth for. Only perspective is built.
    pub const ORTHOGRAPHIC_CAMERA: u32 = 0;

    pub fn for_mode(mode: DepthMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> DepthMode {
        self.mode
    }

    /// Cache key, distinct per variant.
    pub fn name(&self) -> &'static str {
        match self.mode {
            DepthMode::HardwareTexture => "water-hardware-depth",
            DepthMode::PackedColor => "water-packed-depth",
        }
    }

    /// Compile-time constants, the `t_depth` binding and its reader.
    pub fn prelude(&self) -> String {
        let (texture_type, read_expr) = match self.mode {
            DepthMode::HardwareTexture => ("texture_depth_2d", "textureLoad(t_depth, texel, 0)"),
            DepthMode::PackedColor => (
                "texture_2d<f32>",
                "unpack_depth(textureLoad(t_depth, texel, 0))",
            ),
        };
        format!(
            "const DEPTH_PACKING: u32 = {packing}u;
const ORTHOGRAPHIC_CAMERA: u32 = {ortho}u;

@group(1) @binding(1)
var t_depth: {texture_type};

fn read_scene_depth(screen_uv: vec2<f32>) -> f32 {{
    let dims = vec2<f32>(textureDimensions(t_depth));
    let texel = vec2<i32>(clamp(screen_uv * dims, vec2<f32>(0.0), dims - vec2<f32>(1.0)));
    return {read_expr};
}}
",
            packing = self.mode.packing_define(),
            ortho = Self::ORTHOGRAPHIC_CAMERA,
        )
    }

    /// Full program source.
    pub fn source(&self) -> String {
        let prelude = self.prelude();
        compose(&[&prelude, COMMON_WGSL, PACKING_WGSL, WATER_WGSL])
    }
}

/// Central registry for compiled shader modules.
///
/// Each program is compiled once per session; later lookups share the module.
pub struct ShaderLibrary {
    modules: HashMap<String, Arc<wgpu::ShaderModule>>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
        }
    }

    /// Compile `source` under `name`, replacing any module already cached there.
    pub fn load_from_source(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        source: &str,
    ) -> Arc<wgpu::ShaderModule> {
        debug!("Compiling shader '{}'", name);

        let module = Arc::new(device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        }));

        if self.modules.insert(name.to_string(), module.clone()).is_some() {
            info!("Replaced shader '{}'", name);
        } else {
            info!("Loaded shader '{}'", name);
        }
        module
    }

    /// Return the cached module for `name`, compiling `source()` on first use.
    pub fn get_or_load(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        source: impl FnOnce() -> String,
    ) -> Arc<wgpu::ShaderModule> {
        if let Some(module) = self.modules.get(name) {
            return module.clone();
        }
        self.load_from_source(device, name, &source())
    }

    /// Compile (or fetch) the water program for `variant`.
    pub fn water_variant(
        &mut self,
        device: &wgpu::Device,
        variant: WaterShaderVariant,
    ) -> Arc<wgpu::ShaderModule> {
        self.get_or_load(device, variant.name(), || variant.source())
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Default for ShaderLibrary {
    fn default() -> Self {
        Self::new()
    }
}
