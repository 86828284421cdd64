//! The two-pass water renderer.
//!
//! [`WaterRenderer`] owns every GPU resource the frame needs and hands a
//! [`GpuPassExecutor`] to the [`FrameScheduler`], which decides what each
//! pass draws. The executor only translates a [`PassConfig`] into wgpu calls.

use std::path::{Path, PathBuf};

use crate::camera::{Camera, FogUniform};
use crate::capture::{CaptureError, DepthCapture};
use crate::color::hex_to_clear_color;
use crate::depth::{DepthBuffer, DepthMode, DepthPreference, PACKED_CLEAR_COLOR};
use crate::encoder::DepthEncoder;
use crate::frame::FrameBindings;
use crate::gpu::{RenderContext, SurfaceError};
use crate::pass::{FrameEncoder, RenderPassBuilder};
use crate::scene::{SceneDesc, SceneRenderer};
use crate::schedule::{
    FrameReport, FrameScheduler, OverrideMaterial, PassConfig, PassExecutor, PassTarget, WaterDraw,
};
use crate::shader::{ShaderLibrary, WaterShaderVariant};
use crate::texture::{FlowTexture, TextureError};
use crate::viewport::{PixelSize, ViewportChange};
use crate::water::{FlowSettings, ParameterSource, WaterSurfaceDescriptor, WaterSurfaceEffect};

#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("depth capture: {0}")]
    Capture(#[from] CaptureError),

    #[error("flow texture: {0}")]
    Texture(#[from] TextureError),
}

/// Startup settings for [`WaterRenderer`].
#[derive(Debug, Clone)]
pub struct RendererSettings {
    pub depth_preference: DepthPreference,
    pub camera: Camera,
    pub fog: FogUniform,
    /// Display clear color, `0xRRGGBB` sRGB.
    pub background: u32,
    pub flow: FlowSettings,
    /// Distortion texture on disk. `None` or an unreadable file selects the procedural pattern.
    pub flow_texture: Option<PathBuf>,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            depth_preference: DepthPreference::Auto,
            camera: Camera::default(),
            fog: FogUniform::disabled(),
            background: 0x1e485e,
            flow: FlowSettings::default(),
            flow_texture: None,
        }
    }
}

/// Load the configured flow texture, falling back to the procedural one.
pub fn load_flow_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    path: Option<&Path>,
) -> Result<FlowTexture, TextureError> {
    if let Some(path) = path {
        match FlowTexture::from_file(device, queue, path) {
            Ok(texture) => return Ok(texture),
            Err(e) => log::warn!(
                "Failed to load flow texture {}: {e}; using procedural pattern",
                path.display()
            ),
        }
    }
    FlowTexture::procedural(device, queue)
}

/// Bring the capture target and the water effect to `size` together.
///
/// The water bind group is rebuilt only when the capture target was
/// reallocated. Returns whether that happened.
fn sync_capture_size(
    device: &wgpu::Device,
    capture: &mut DepthCapture,
    water: &mut WaterSurfaceEffect,
    size: PixelSize,
) -> Result<bool, CaptureError> {
    let reallocated = capture.resize(device, size)?;
    if reallocated {
        water.rebind_depth_source(device, capture.depth_source());
    }
    water.set_resolution(size);
    Ok(reallocated)
}

pub struct WaterRenderer {
    ctx: RenderContext,
    // Keeps compiled modules alive for the lifetime of the pipelines.
    _shaders: ShaderLibrary,
    frame: FrameBindings,
    camera: Camera,
    scene: SceneRenderer,
    depth_encoder: DepthEncoder,
    capture: DepthCapture,
    display_depth: DepthBuffer,
    water: WaterSurfaceEffect,
    scheduler: FrameScheduler,
    background: wgpu::Color,
}

impl WaterRenderer {
    pub fn new(
        ctx: RenderContext,
        scene_desc: &SceneDesc,
        settings: RendererSettings,
    ) -> Result<Self, RendererError> {
        let mode = DepthMode::detect(&ctx.adapter, settings.depth_preference);
        let (width, height) = ctx.surface_size();
        let size = PixelSize::new(width, height);

        let mut camera = settings.camera;
        camera.set_aspect_ratio(width as f32, height as f32);

        let device = &ctx.device;
        let mut shaders = ShaderLibrary::new();
        let frame = FrameBindings::new(device, &camera.to_uniform(), &settings.fog);
        let scene = SceneRenderer::new(
            device,
            &mut shaders,
            &frame.layout,
            ctx.surface_format,
            scene_desc,
        );
        let depth_encoder = DepthEncoder::new(
            device,
            &mut shaders,
            &frame.layout,
            scene.object_layout(),
            mode,
        );
        let capture = DepthCapture::new(device, mode, size)?;
        let display_depth = DepthBuffer::new(device, width, height);

        let flow_texture = load_flow_texture(device, &ctx.queue, settings.flow_texture.as_deref())?;
        let water = WaterSurfaceEffect::new(
            device,
            &mut shaders,
            WaterSurfaceDescriptor {
                frame_layout: &frame.layout,
                surface_format: ctx.surface_format,
                variant: WaterShaderVariant::for_mode(mode),
                depth_source: capture.depth_source(),
                resolution: size,
                flow: settings.flow,
                camera_near: camera.near(),
                camera_far: camera.far(),
            },
            flow_texture,
        );

        log::info!(
            "Water renderer ready: {} objects, {} depth, {} shader modules, {}x{}",
            scene.object_count(),
            mode.label(),
            shaders.len(),
            width,
            height
        );

        Ok(Self {
            ctx,
            _shaders: shaders,
            frame,
            camera,
            scene,
            depth_encoder,
            capture,
            display_depth,
            water,
            scheduler: FrameScheduler::new(mode),
            background: hex_to_clear_color(settings.background),
        })
    }

    /// Resize the surface, both depth attachments, the water resolution and
    /// the camera aspect in one step.
    ///
    /// The capture target is resized first; if it fails nothing else changes.
    pub fn apply_viewport_change(&mut self, change: &ViewportChange) -> Result<(), RendererError> {
        let size = change.size;
        let device = &self.ctx.device;

        sync_capture_size(device, &mut self.capture, &mut self.water, size)?;
        self.display_depth.resize(device, size.width, size.height);
        self.camera
            .set_aspect_ratio(size.width as f32, size.height as f32);
        self.ctx.resize(size.width, size.height);

        log::debug!(
            "Viewport synced to {}x{} (scale {})",
            size.width,
            size.height,
            change.scale_factor
        );
        Ok(())
    }

    /// Render one frame: depth pass, parameter poll, composite pass, present.
    pub fn render_frame(
        &mut self,
        params: &mut dyn ParameterSource,
    ) -> Result<FrameReport, SurfaceError> {
        let surface_texture = self.ctx.get_current_texture()?;
        let mut frame_encoder = FrameEncoder::new(&self.ctx.device, surface_texture);
        self.frame.write_camera(&self.ctx.queue, &self.camera.to_uniform());

        let report = {
            let (encoder, surface_view) = frame_encoder.parts();
            let mut executor = GpuPassExecutor {
                encoder,
                surface_view,
                queue: &self.ctx.queue,
                frame: &self.frame,
                scene: &self.scene,
                depth_encoder: &self.depth_encoder,
                capture: &self.capture,
                display_depth: &self.display_depth,
                water: &self.water,
                background: self.background,
            };
            let water = &self.water;
            self.scheduler
                .run_frame(&mut executor, params, |time, current| {
                    water.update_uniforms(time, current)
                })
        };

        frame_encoder.submit(&self.ctx.queue);
        Ok(report)
    }

    /// Reconfigure the surface at the current size after a lost surface.
    pub fn reconfigure_surface(&mut self) {
        let size = self.capture.size();
        self.ctx.resize(size.width, size.height);
    }

    pub fn set_fog(&self, fog: &FogUniform) {
        self.frame.write_fog(&self.ctx.queue, fog);
    }

    pub fn depth_mode(&self) -> DepthMode {
        self.capture.mode()
    }

    pub fn size(&self) -> PixelSize {
        self.capture.size()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.scheduler.frames_rendered()
    }

    pub fn context(&self) -> &RenderContext {
        &self.ctx
    }
}

/// Records one frame's passes into a command encoder.
struct GpuPassExecutor<'f> {
    encoder: &'f mut wgpu::CommandEncoder,
    surface_view: &'f wgpu::TextureView,
    queue: &'f wgpu::Queue,
    frame: &'f FrameBindings,
    scene: &'f SceneRenderer,
    depth_encoder: &'f DepthEncoder,
    capture: &'f DepthCapture,
    display_depth: &'f DepthBuffer,
    water: &'f WaterSurfaceEffect,
    background: wgpu::Color,
}

impl PassExecutor for GpuPassExecutor<'_> {
    fn execute(&mut self, pass: &PassConfig<'_>) {
        let builder = match pass.target {
            PassTarget::Offscreen => {
                let target = self.capture.target();
                let builder = RenderPassBuilder::new()
                    .label("depth-pass")
                    .depth(&target.depth_view, DepthBuffer::CLEAR_VALUE);
                if self.capture.writes_color() {
                    builder.color(&target.color_view, PACKED_CLEAR_COLOR)
                } else {
                    builder
                }
            }
            PassTarget::Display => RenderPassBuilder::new()
                .label("composite-pass")
                .color(self.surface_view, self.background)
                .depth(&self.display_depth.view, DepthBuffer::CLEAR_VALUE),
        };

        let mut render_pass = builder.begin(self.encoder);
        render_pass.set_bind_group(0, &self.frame.bind_group, &[]);

        match pass.override_material {
            OverrideMaterial::None => self.scene.draw_lit(&mut render_pass),
            OverrideMaterial::DepthOnly | OverrideMaterial::PackedDepth => self
                .scene
                .draw_with(&mut render_pass, self.depth_encoder.pipeline()),
        }

        if let WaterDraw::Visible(uniforms) = pass.water {
            self.water.draw(self.queue, &mut render_pass, uniforms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::BoxDesc;
    use crate::test_support::create_test_device;
    use crate::water::WaterParams;
    use glam::Vec3;

    const SURFACE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    #[test]
    fn test_default_settings() {
        let settings = RendererSettings::default();
        assert_eq!(settings.depth_preference, DepthPreference::Auto);
        assert!(settings.flow_texture.is_none());
        assert_eq!(settings.camera.near(), 0.1);
        assert_eq!(settings.camera.far(), 100.0);
    }

    #[test]
    fn test_missing_flow_texture_falls_back_to_procedural() {
        let Some((_adapter, device, queue)) = create_test_device() else {
            return;
        };
        let texture =
            load_flow_texture(&device, &queue, Some(Path::new("does/not/exist.png"))).unwrap();
        assert_eq!(
            texture.dimensions(),
            (
                crate::texture::PROCEDURAL_FLOW_SIZE,
                crate::texture::PROCEDURAL_FLOW_SIZE
            )
        );
    }

    /// Everything a frame needs, minus the window surface.
    struct OffscreenRig {
        frame: FrameBindings,
        scene: SceneRenderer,
        depth_encoder: DepthEncoder,
        capture: DepthCapture,
        display_depth: DepthBuffer,
        water: WaterSurfaceEffect,
        display_view: wgpu::TextureView,
        scheduler: FrameScheduler,
        _shaders: ShaderLibrary,
    }

    fn display_view(device: &wgpu::Device, size: PixelSize) -> wgpu::TextureView {
        let display = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("test-display"),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SURFACE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        display.create_view(&wgpu::TextureViewDescriptor::default())
    }

    impl OffscreenRig {
        fn new(device: &wgpu::Device, queue: &wgpu::Queue, mode: DepthMode, size: PixelSize) -> Self {
            let mut shaders = ShaderLibrary::new();
            let camera = Camera::default();
            let frame = FrameBindings::new(device, &camera.to_uniform(), &FogUniform::disabled());
            let scene_desc = SceneDesc {
                boxes: vec![BoxDesc::new(Vec3::ONE, Vec3::ZERO).colored(0xea4d10)],
                ..SceneDesc::default()
            };
            let scene =
                SceneRenderer::new(device, &mut shaders, &frame.layout, SURFACE_FORMAT, &scene_desc);
            let depth_encoder =
                DepthEncoder::new(device, &mut shaders, &frame.layout, scene.object_layout(), mode);
            let capture = DepthCapture::new(device, mode, size).unwrap();
            let display_depth = DepthBuffer::new(device, size.width, size.height);
            let flow_texture = FlowTexture::procedural(device, queue).unwrap();
            let water = WaterSurfaceEffect::new(
                device,
                &mut shaders,
                WaterSurfaceDescriptor {
                    frame_layout: &frame.layout,
                    surface_format: SURFACE_FORMAT,
                    variant: WaterShaderVariant::for_mode(mode),
                    depth_source: capture.depth_source(),
                    resolution: size,
                    flow: FlowSettings::default(),
                    camera_near: camera.near(),
                    camera_far: camera.far(),
                },
                flow_texture,
            );
            Self {
                frame,
                scene,
                depth_encoder,
                capture,
                display_depth,
                water,
                display_view: display_view(device, size),
                scheduler: FrameScheduler::new(mode),
                _shaders: shaders,
            }
        }

        fn resize(&mut self, device: &wgpu::Device, size: PixelSize) -> bool {
            let reallocated =
                sync_capture_size(device, &mut self.capture, &mut self.water, size).unwrap();
            self.display_depth.resize(device, size.width, size.height);
            self.display_view = display_view(device, size);
            reallocated
        }

        fn render(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, frames: usize) {
            let mut params = WaterParams::default();
            for _ in 0..frames {
                let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("test-frame"),
                });
                let mut executor = GpuPassExecutor {
                    encoder: &mut encoder,
                    surface_view: &self.display_view,
                    queue,
                    frame: &self.frame,
                    scene: &self.scene,
                    depth_encoder: &self.depth_encoder,
                    capture: &self.capture,
                    display_depth: &self.display_depth,
                    water: &self.water,
                    background: wgpu::Color::BLACK,
                };
                let water = &self.water;
                self.scheduler
                    .run_frame(&mut executor, &mut params, |time, current| {
                        water.update_uniforms(time, current)
                    });
                queue.submit(std::iter::once(encoder.finish()));
            }
        }
    }

    /// Record and submit full frames offscreen.
    fn run_offscreen_frames(mode: DepthMode) {
        let Some((adapter, device, queue)) = create_test_device() else {
            return;
        };
        if mode == DepthMode::HardwareTexture
            && DepthMode::detect(&adapter, DepthPreference::Auto) != mode
        {
            return;
        }

        let mut rig = OffscreenRig::new(&device, &queue, mode, PixelSize::new(64, 48));
        rig.render(&device, &queue, 2);
        assert_eq!(rig.scheduler.frames_rendered(), 2);
    }

    #[test]
    fn test_offscreen_frames_packed_depth() {
        run_offscreen_frames(DepthMode::PackedColor);
    }

    #[test]
    fn test_offscreen_frames_hardware_depth() {
        run_offscreen_frames(DepthMode::HardwareTexture);
    }

    #[test]
    fn test_detected_depth_mode_builds_and_renders() {
        let Some((adapter, device, queue)) = create_test_device() else {
            return;
        };
        // Whatever the adapter's backend, the automatic choice must produce
        // a water pipeline that can be created and drawn.
        let mode = DepthMode::detect(&adapter, DepthPreference::Auto);
        let mut rig = OffscreenRig::new(&device, &queue, mode, PixelSize::new(32, 32));
        rig.render(&device, &queue, 1);
        assert_eq!(rig.water.variant(), WaterShaderVariant::for_mode(mode));
    }

    #[test]
    fn test_resize_keeps_capture_and_water_resolution_equal() {
        let Some((adapter, device, queue)) = create_test_device() else {
            return;
        };
        let mode = DepthMode::detect(&adapter, DepthPreference::Auto);
        let mut rig = OffscreenRig::new(&device, &queue, mode, PixelSize::new(64, 48));
        assert_eq!(rig.capture.size(), rig.water.resolution());

        let grown = PixelSize::new(160, 90);
        assert!(rig.resize(&device, grown));
        assert_eq!(rig.capture.size(), grown);
        assert_eq!(rig.water.resolution(), grown);

        // Same size again: nothing is reallocated and the sizes stay paired.
        assert!(!rig.resize(&device, grown));
        assert_eq!(rig.capture.size(), rig.water.resolution());

        // The rebuilt bind group must reference the new capture target.
        rig.render(&device, &queue, 1);
    }
}
