//! Scene dressing: lit boxes that give the water something to meet.
//!
//! The scene is described declaratively ([`SceneDesc`]) and uploaded once by
//! [`SceneRenderer`], which can draw it either with its own Lambert material
//! or with an override pipeline supplied by the depth pass.

use bytemuck::{Pod, Zeroable};
use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::buffer::{BufferAllocator, MeshBuffer, uniform_layout_entry};
use crate::color::srgb_hex_to_linear;
use crate::depth::DepthBuffer;
use crate::mesh::{Vertex, box_mesh};
use crate::shader::{SCENE_SHADER, ShaderLibrary, scene_shader_source};

/// Per-object uniform (group 1, binding 0).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    /// Linear RGB, alpha unused.
    pub color: [f32; 4],
}

/// Light uniform (group 2, binding 0).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct LightUniform {
    pub ambient: [f32; 4],
    /// Unit vector pointing towards the directional light.
    pub direction: [f32; 4],
    pub directional: [f32; 4],
}

/// Ambient light plus one directional light.
#[derive(Clone, Debug, PartialEq)]
pub struct Lights {
    pub ambient_color: u32,
    pub ambient_intensity: f32,
    pub directional_color: u32,
    pub directional_intensity: f32,
    /// Light position; the light shines from here towards the origin.
    pub directional_position: Vec3,
}

impl Default for Lights {
    fn default() -> Self {
        Self {
            ambient_color: 0xcccccc,
            ambient_intensity: 0.4,
            directional_color: 0xffffff,
            directional_intensity: 0.8,
            directional_position: Vec3::new(0.0, 5.0, 5.0),
        }
    }
}

impl Lights {
    pub fn to_uniform(&self) -> LightUniform {
        let scaled = |hex: u32, intensity: f32| {
            let [r, g, b] = srgb_hex_to_linear(hex);
            [r * intensity, g * intensity, b * intensity, 1.0]
        };
        LightUniform {
            ambient: scaled(self.ambient_color, self.ambient_intensity),
            direction: self.directional_position.normalize_or(Vec3::Y).extend(0.0).to_array(),
            directional: scaled(self.directional_color, self.directional_intensity),
        }
    }
}

/// One box in the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxDesc {
    pub size: Vec3,
    pub position: Vec3,
    /// XYZ Euler angles in radians.
    pub rotation: Vec3,
    /// `0xRRGGBB` sRGB.
    pub color: u32,
}

impl BoxDesc {
    pub fn new(size: Vec3, position: Vec3) -> Self {
        Self {
            size,
            position,
            rotation: Vec3::ZERO,
            color: 0xffffff,
        }
    }

    pub fn rotated(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn colored(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    /// Rigid transform; the size is baked into the mesh so normals stay unit length.
    pub fn transform(&self) -> Mat4 {
        let rotation = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        Mat4::from_rotation_translation(rotation, self.position)
    }

    pub fn to_uniform(&self) -> ObjectUniform {
        let [r, g, b] = srgb_hex_to_linear(self.color);
        ObjectUniform {
            model: self.transform().to_cols_array_2d(),
            color: [r, g, b, 1.0],
        }
    }
}

/// Declarative scene: boxes and lights.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneDesc {
    pub boxes: Vec<BoxDesc>,
    pub lights: Lights,
}

struct GpuObject {
    mesh: MeshBuffer,
    bind_group: wgpu::BindGroup,
}

/// GPU-resident scene with its Lambert pipeline.
pub struct SceneRenderer {
    pipeline: wgpu::RenderPipeline,
    object_layout: wgpu::BindGroupLayout,
    light_bind_group: wgpu::BindGroup,
    objects: Vec<GpuObject>,
}

impl SceneRenderer {
    /// Layout of the per-object group; shared with override pipelines.
    pub fn create_object_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object-bgl"),
            entries: &[uniform_layout_entry::<ObjectUniform>(
                0,
                wgpu::ShaderStages::VERTEX_FRAGMENT,
            )],
        })
    }

    pub fn new(
        device: &wgpu::Device,
        shaders: &mut ShaderLibrary,
        frame_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
        desc: &SceneDesc,
    ) -> Self {
        let shader = shaders.get_or_load(device, SCENE_SHADER, scene_shader_source);
        let object_layout = Self::create_object_layout(device);

        let light_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("light-bgl"),
            entries: &[uniform_layout_entry::<LightUniform>(0, wgpu::ShaderStages::FRAGMENT)],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene-pipeline-layout"),
            bind_group_layouts: &[frame_layout, &object_layout, &light_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
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
                format: DepthBuffer::FORMAT,
                depth_write_enabled: true,
                depth_compare: DepthBuffer::COMPARE_FUNCTION,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
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

        let allocator = BufferAllocator::new(device);
        let light_buffer = allocator.create_uniform("light-uniform", &desc.lights.to_uniform());
        let light_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("light-bg"),
            layout: &light_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: light_buffer.as_entire_binding(),
            }],
        });

        let objects = desc
            .boxes
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let label = format!("scene-box-{i}");
                let mesh = allocator.create_mesh(&label, &box_mesh(item.size.x, item.size.y, item.size.z));
                let buffer = allocator.create_uniform(&format!("{label}-uniform"), &item.to_uniform());
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&label),
                    layout: &object_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                });
                GpuObject { mesh, bind_group }
            })
            .collect::<Vec<_>>();

        log::info!("Scene uploaded: {} boxes", objects.len());

        Self {
            pipeline,
            object_layout,
            light_bind_group,
            objects,
        }
    }

    pub fn object_layout(&self) -> &wgpu::BindGroupLayout {
        &self.object_layout
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Draw every object with the Lambert material. Group 0 must already be bound.
    pub fn draw_lit(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(2, &self.light_bind_group, &[]);
        self.draw_objects(render_pass);
    }

    /// Draw every object with `pipeline` in place of the scene material.
    pub fn draw_with(&self, render_pass: &mut wgpu::RenderPass<'_>, pipeline: &wgpu::RenderPipeline) {
        render_pass.set_pipeline(pipeline);
        self.draw_objects(render_pass);
    }

    fn draw_objects(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        for object in &self.objects {
            render_pass.set_bind_group(1, &object.bind_group, &[]);
            object.mesh.bind(render_pass);
            object.mesh.draw(render_pass);
        }
    }
}
