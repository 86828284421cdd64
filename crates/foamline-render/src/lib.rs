//! Stylized water rendering: depth capture, packed-depth encoding, shoreline foam,
//! and the two-pass frame schedule that ties them together.

pub mod buffer;
pub mod camera;
pub mod capture;
pub mod color;
pub mod depth;
pub mod encoder;
pub mod frame;
pub mod gpu;
pub mod mesh;
pub mod pass;
pub mod renderer;
pub mod scene;
pub mod schedule;
pub mod shader;
pub mod texture;
pub mod viewport;
pub mod water;

#[cfg(test)]
mod test_support;

pub use camera::{Camera, CameraUniform, FogUniform};
pub use capture::{CaptureError, DepthCapture, DepthSource, RenderTarget};
pub use color::{hex_to_clear_color, srgb_hex_to_linear};
pub use depth::{DepthBuffer, DepthMode, DepthPreference, pack_depth, unpack_depth};
pub use encoder::DepthEncoder;
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use renderer::{RendererError, RendererSettings, WaterRenderer};
pub use scene::{BoxDesc, Lights, SceneDesc};
pub use schedule::{FrameClock, FrameReport, FrameScheduler, PassConfig, PassExecutor};
pub use shader::{ShaderLibrary, WaterShaderVariant};
pub use texture::{FlowTexture, TextureError};
pub use viewport::{PixelSize, ViewportChange, ViewportSync};
pub use water::{
    FlowSettings, ParameterSource, WaterParams, WaterSurfaceEffect, WaterUniforms,
};
