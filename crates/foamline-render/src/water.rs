//! The water surface: foam classification, per-frame uniform snapshot, and GPU pipeline.
//!
//! Each fragment of the water plane compares its own view-space depth with the
//! captured scene depth behind it. Where the two are close (the water meets
//! geometry) the fragment turns to foam; elsewhere it keeps the water color.
//! A scrolling flow texture perturbs the difference so the shoreline moves.

use bytemuck::{Pod, Zeroable};

use crate::buffer::{BufferAllocator, MeshBuffer, uniform_layout_entry};
use crate::capture::DepthSource;
use crate::color::srgb_hex_to_linear;
use crate::depth::{DepthBuffer, perspective_depth_to_view_z};
use crate::mesh::{Vertex, plane_mesh};
use crate::shader::{ShaderLibrary, WaterShaderVariant};
use crate::texture::FlowTexture;
use crate::viewport::PixelSize;

/// Lowest accepted foam threshold.
pub const MIN_THRESHOLD: f32 = 0.1;
/// Highest accepted foam threshold; every fragment is foam at this value.
pub const MAX_THRESHOLD: f32 = 1.0;

/// Edge length of the square water plane in world units.
pub const WATER_PLANE_SIZE: f32 = 10.0;

/// Live-editable appearance, polled once per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaterParams {
    /// Linear RGB foam color.
    pub foam_color: [f32; 3],
    /// Linear RGB water color.
    pub water_color: [f32; 3],
    /// Depth difference at or below which a fragment is foam, in `[0.1, 1]`.
    pub threshold: f32,
}

impl WaterParams {
    /// Build from `0xRRGGBB` sRGB colors, clamping the threshold into range.
    pub fn from_hex(foam_color: u32, water_color: u32, threshold: f32) -> Self {
        Self {
            foam_color: srgb_hex_to_linear(foam_color),
            water_color: srgb_hex_to_linear(water_color),
            threshold: clamp_threshold(threshold),
        }
    }
}

impl Default for WaterParams {
    fn default() -> Self {
        Self::from_hex(0xffffff, 0x14c6a5, MIN_THRESHOLD)
    }
}

fn clamp_threshold(threshold: f32) -> f32 {
    if threshold.is_nan() {
        return MIN_THRESHOLD;
    }
    threshold.clamp(MIN_THRESHOLD, MAX_THRESHOLD)
}

/// Pull-based source of the current [`WaterParams`].
pub trait ParameterSource {
    /// Current parameter values; called once per frame before the composite pass.
    fn current(&mut self) -> WaterParams;
}

impl ParameterSource for WaterParams {
    fn current(&mut self) -> WaterParams {
        *self
    }
}

/// How the flow texture perturbs the foam edge. Fixed for the session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowSettings {
    /// Scale applied to the signed texture sample.
    pub distortion_strength: f32,
    /// UV scroll speed per second.
    pub flow_speed: f32,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            distortion_strength: 1.0,
            flow_speed: 0.05,
        }
    }
}

/// Immutable per-frame snapshot of everything the water shader reads (group 1, binding 0).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct WaterUniforms {
    pub time: f32,
    pub threshold: f32,
    pub distortion_strength: f32,
    pub flow_speed: f32,
    /// Capture target size in pixels.
    pub resolution: [f32; 2],
    pub camera_near: f32,
    pub camera_far: f32,
    pub foam_color: [f32; 3],
    pub _pad0: f32,
    pub water_color: [f32; 3],
    pub _pad1: f32,
}

/// Classification of one water fragment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FragmentClass {
    Foam,
    Water,
}

/// Signed displacement from a flow texture red sample in `[0, 1]`.
pub fn flow_displacement(dudv_red: f32, distortion_strength: f32) -> f32 {
    (dudv_red * 2.0 - 1.0) * distortion_strength
}

/// UV at which the flow texture is sampled for a surface UV at `time`.
pub fn flow_uv(uv: [f32; 2], time: f32, flow_speed: f32) -> [f32; 2] {
    let offset = time * flow_speed;
    [uv[0] * 2.0 - offset, uv[1] * 2.0 - offset]
}

/// Saturated distance between the surface and the scene behind it, plus displacement.
pub fn depth_difference(surface_view_z: f32, scene_view_z: f32, displacement: f32) -> f32 {
    ((surface_view_z - scene_view_z).abs() + displacement).clamp(0.0, 1.0)
}

/// Hard step: foam when `difference <= threshold`.
///
/// The comparison is inclusive, so a threshold of 1.0 (the saturation ceiling)
/// classifies every fragment as foam.
pub fn classify_fragment(difference: f32, threshold: f32) -> FragmentClass {
    if difference <= threshold {
        FragmentClass::Foam
    } else {
        FragmentClass::Water
    }
}

impl WaterUniforms {
    /// Build the snapshot for one composite pass.
    pub fn new(
        time: f32,
        params: &WaterParams,
        flow: &FlowSettings,
        resolution: PixelSize,
        camera_near: f32,
        camera_far: f32,
    ) -> Self {
        Self {
            time,
            threshold: clamp_threshold(params.threshold),
            distortion_strength: flow.distortion_strength,
            flow_speed: flow.flow_speed,
            resolution: resolution.to_array(),
            camera_near,
            camera_far,
            foam_color: params.foam_color,
            _pad0: 0.0,
            water_color: params.water_color,
            _pad1: 0.0,
        }
    }

    /// CPU mirror of the fragment shader's foam decision for normalized depths.
    pub fn classify_depths(&self, surface_depth: f32, scene_depth: f32, displacement: f32) -> FragmentClass {
        let surface_z = perspective_depth_to_view_z(surface_depth, self.camera_near, self.camera_far);
        let scene_z = perspective_depth_to_view_z(scene_depth, self.camera_near, self.camera_far);
        classify_fragment(depth_difference(surface_z, scene_z, displacement), self.threshold)
    }
}

/// Owns the water mesh, its shader variant, uniform buffer and bind group.
pub struct WaterSurfaceEffect {
    variant: WaterShaderVariant,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    mesh: MeshBuffer,
    flow_texture: FlowTexture,
    flow: FlowSettings,
    camera_near: f32,
    camera_far: f32,
    resolution: PixelSize,
}

/// Construction inputs for [`WaterSurfaceEffect`].
pub struct WaterSurfaceDescriptor<'a> {
    /// Group 0 layout shared with the scene pipelines.
    pub frame_layout: &'a wgpu::BindGroupLayout,
    pub surface_format: wgpu::TextureFormat,
    pub variant: WaterShaderVariant,
    pub depth_source: DepthSource<'a>,
    /// Initial capture target size.
    pub resolution: PixelSize,
    pub flow: FlowSettings,
    pub camera_near: f32,
    pub camera_far: f32,
}

impl WaterSurfaceEffect {
    pub fn new(
        device: &wgpu::Device,
        shaders: &mut ShaderLibrary,
        desc: WaterSurfaceDescriptor<'_>,
        flow_texture: FlowTexture,
    ) -> Self {
        let WaterSurfaceDescriptor {
            frame_layout,
            surface_format,
            variant,
            depth_source,
            resolution,
            flow,
            camera_near,
            camera_far,
        } = desc;
        let shader = shaders.water_variant(device, variant);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("water-bgl"),
            entries: &[
                uniform_layout_entry::<WaterUniforms>(0, wgpu::ShaderStages::FRAGMENT),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: depth_source.binding_type(),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("water-pipeline-layout"),
            bind_group_layouts: &[frame_layout, &bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(variant.name()),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_water"),
                buffers: &[Vertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DepthBuffer::FORMAT,
                depth_write_enabled: true,
                depth_compare: DepthBuffer::COMPARE_FUNCTION,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_water"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        let initial = WaterUniforms::new(
            0.0,
            &WaterParams::default(),
            &flow,
            resolution,
            camera_near,
            camera_far,
        );
        let allocator = BufferAllocator::new(device);
        let uniform_buffer = allocator.create_uniform("water-uniform", &initial);
        let mesh = allocator.create_mesh("water-plane", &plane_mesh(WATER_PLANE_SIZE, WATER_PLANE_SIZE));

        let bind_group = Self::create_bind_group(
            device,
            &bind_group_layout,
            &uniform_buffer,
            depth_source,
            &flow_texture,
        );

        Self {
            variant,
            pipeline,
            bind_group_layout,
            bind_group,
            uniform_buffer,
            mesh,
            flow_texture,
            flow,
            camera_near,
            camera_far,
            resolution,
        }
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniform_buffer: &wgpu::Buffer,
        depth_source: DepthSource<'_>,
        flow_texture: &FlowTexture,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("water-bg"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(depth_source.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&flow_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&flow_texture.sampler),
                },
            ],
        })
    }

    /// Point the `t_depth` binding at a (re)allocated capture target.
    pub fn rebind_depth_source(&mut self, device: &wgpu::Device, depth_source: DepthSource<'_>) {
        self.bind_group = Self::create_bind_group(
            device,
            &self.bind_group_layout,
            &self.uniform_buffer,
            depth_source,
            &self.flow_texture,
        );
        log::debug!("Water depth source rebound");
    }

    /// Build this frame's uniform snapshot from the current parameters.
    pub fn update_uniforms(&self, time: f32, params: &WaterParams) -> WaterUniforms {
        WaterUniforms::new(
            time,
            params,
            &self.flow,
            self.resolution,
            self.camera_near,
            self.camera_far,
        )
    }

    /// Must match the capture target size; updated together with it.
    pub fn set_resolution(&mut self, resolution: PixelSize) {
        self.resolution = resolution;
    }

    pub fn resolution(&self) -> PixelSize {
        self.resolution
    }

    pub fn variant(&self) -> WaterShaderVariant {
        self.variant
    }

    /// Upload `uniforms` and draw the water plane.
    pub fn draw(&self, queue: &wgpu::Queue, render_pass: &mut wgpu::RenderPass<'_>, uniforms: &WaterUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(1, &self.bind_group, &[]);
        self.mesh.bind(render_pass);
        self.mesh.draw(render_pass);
    }
}
