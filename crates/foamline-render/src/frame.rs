//! Per-frame bindings shared by every pipeline (group 0): camera and fog.

use crate::buffer::{BufferAllocator, uniform_layout_entry};
use crate::camera::{CameraUniform, FogUniform};

pub struct FrameBindings {
    pub layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
    camera_buffer: wgpu::Buffer,
    fog_buffer: wgpu::Buffer,
}

impl FrameBindings {
    pub fn new(device: &wgpu::Device, camera: &CameraUniform, fog: &FogUniform) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame-bgl"),
            entries: &[
                uniform_layout_entry::<CameraUniform>(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                uniform_layout_entry::<FogUniform>(1, wgpu::ShaderStages::FRAGMENT),
            ],
        });

        let allocator = BufferAllocator::new(device);
        let camera_buffer = allocator.create_uniform("camera-uniform", camera);
        let fog_buffer = allocator.create_uniform("fog-uniform", fog);

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame-bg"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: fog_buffer.as_entire_binding(),
                },
            ],
        });

        Self {
            layout,
            bind_group,
            camera_buffer,
            fog_buffer,
        }
    }

    pub fn write_camera(&self, queue: &wgpu::Queue, camera: &CameraUniform) {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(camera));
    }

    pub fn write_fog(&self, queue: &wgpu::Queue, fog: &FogUniform) {
        queue.write_buffer(&self.fog_buffer, 0, bytemuck::bytes_of(fog));
    }
}
