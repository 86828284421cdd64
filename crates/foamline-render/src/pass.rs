//! Render pass boilerplate.
//!
//! [`RenderPassBuilder`] assembles attachments declaratively; [`FrameEncoder`]
//! owns the command encoder and surface texture for one frame.

/// Builder for one render pass over borrowed attachments.
#[derive(Debug, Default)]
pub struct RenderPassBuilder<'a> {
    color: Option<(&'a wgpu::TextureView, wgpu::Color)>,
    depth: Option<(&'a wgpu::TextureView, f32)>,
    label: Option<&'static str>,
}

impl<'a> RenderPassBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear `view` to `clear` and store the result.
    pub fn color(mut self, view: &'a wgpu::TextureView, clear: wgpu::Color) -> Self {
        self.color = Some((view, clear));
        self
    }

    /// Clear the depth attachment to `clear_value` and store it.
    pub fn depth(mut self, view: &'a wgpu::TextureView, clear_value: f32) -> Self {
        self.depth = Some((view, clear_value));
        self
    }

    pub fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    pub fn has_color(&self) -> bool {
        self.color.is_some()
    }

    pub fn has_depth(&self) -> bool {
        self.depth.is_some()
    }

    pub fn begin<'e>(&self, encoder: &'e mut wgpu::CommandEncoder) -> wgpu::RenderPass<'e> {
        let color_attachment = self.color.map(|(view, clear)| wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        });
        let depth_stencil_attachment =
            self.depth
                .map(|(view, clear_value)| wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_value),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                });

        // A depth-only pass has no color attachments at all.
        let colors = [color_attachment];
        let color_attachments: &[Option<wgpu::RenderPassColorAttachment<'_>>] =
            if colors[0].is_some() { &colors } else { &[] };

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: self.label,
            color_attachments,
            depth_stencil_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}

/// Command encoder and surface texture for one frame.
pub struct FrameEncoder {
    encoder: wgpu::CommandEncoder,
    surface_texture: wgpu::SurfaceTexture,
    surface_view: wgpu::TextureView,
}

impl FrameEncoder {
    pub fn new(device: &wgpu::Device, surface_texture: wgpu::SurfaceTexture) -> Self {
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame-encoder"),
        });
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            encoder,
            surface_texture,
            surface_view,
        }
    }

    /// Encoder and surface view, borrowed together for pass recording.
    pub fn parts(&mut self) -> (&mut wgpu::CommandEncoder, &wgpu::TextureView) {
        (&mut self.encoder, &self.surface_view)
    }

    /// Submit the recorded commands and present.
    pub fn submit(self, queue: &wgpu::Queue) {
        queue.submit([self.encoder.finish()]);
        self.surface_texture.present();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::create_test_device;

    #[test]
    fn test_builder_starts_without_attachments() {
        let builder = RenderPassBuilder::new();
        assert!(!builder.has_color());
        assert!(!builder.has_depth());
        assert!(builder.label.is_none());
    }

    #[test]
    fn test_label_is_stored() {
        let builder = RenderPassBuilder::new().label("depth-pass");
        assert_eq!(builder.label, Some("depth-pass"));
    }

    #[test]
    fn test_depth_only_pass_records() {
        let Some((_adapter, device, queue)) = create_test_device() else {
            return;
        };
        let depth = crate::depth::DepthBuffer::new(&device, 16, 16);
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        let builder = RenderPassBuilder::new().depth(&depth.view, 1.0);
        assert!(builder.has_depth() && !builder.has_color());
        drop(builder.begin(&mut encoder));
        queue.submit([encoder.finish()]);
    }
}
