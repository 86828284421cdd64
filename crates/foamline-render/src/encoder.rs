//! The depth-pass override material.
//!
//! Every scene object is drawn with this pipeline instead of its own material
//! while depth is captured. In packed mode the fragment stage writes
//! `pack_depth(frag_coord.z)` into the `Rgba8Unorm` capture color, unblended.
//! In hardware mode the pipeline has no fragment stage at all and only the
//! depth attachment is written.

use crate::capture::RenderTarget;
use crate::depth::{DepthBuffer, DepthMode};
use crate::mesh::Vertex;
use crate::shader::{DEPTH_ENCODER_SHADER, ShaderLibrary, depth_encoder_shader_source};

pub struct DepthEncoder {
    pipeline: wgpu::RenderPipeline,
    mode: DepthMode,
}

impl DepthEncoder {
    /// Build the override pipeline against the scene's group 0 and group 1 layouts.
    pub fn new(
        device: &wgpu::Device,
        shaders: &mut ShaderLibrary,
        frame_layout: &wgpu::BindGroupLayout,
        object_layout: &wgpu::BindGroupLayout,
        mode: DepthMode,
    ) -> Self {
        let shader = shaders.get_or_load(device, DEPTH_ENCODER_SHADER, depth_encoder_shader_source);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("depth-encoder-pipeline-layout"),
            bind_group_layouts: &[frame_layout, object_layout],
            immediate_size: 0,
        });

        let targets = Self::color_targets(mode);
        let fragment = (!targets.is_empty()).then(|| wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_depth"),
            targets: &targets,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(match mode {
                DepthMode::HardwareTexture => "depth-only-pipeline",
                DepthMode::PackedColor => "depth-encoder-pipeline",
            }),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_depth"),
                buffers: &[Vertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: RenderTarget::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: DepthBuffer::COMPARE_FUNCTION,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment,
            multiview_mask: None,
            cache: None,
        });

        Self { pipeline, mode }
    }

    /// Color outputs for `mode`: one unblended `Rgba8Unorm` target when packing, none otherwise.
    pub fn color_targets(mode: DepthMode) -> Vec<Option<wgpu::ColorTargetState>> {
        match mode {
            DepthMode::HardwareTexture => Vec::new(),
            DepthMode::PackedColor => vec![Some(wgpu::ColorTargetState {
                format: RenderTarget::COLOR_FORMAT,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    pub fn mode(&self) -> DepthMode {
        self.mode
    }
}
