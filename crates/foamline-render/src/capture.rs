//! Offscreen capture of scene depth with the water surface excluded.
//!
//! [`RenderTarget`] owns the color and depth attachments the depth pass
//! renders into. [`DepthCapture`] pairs it with the session's [`DepthMode`]
//! and hands out the matching [`DepthSource`] for the water shader.

use crate::depth::{DepthBuffer, DepthMode};
use crate::viewport::PixelSize;

/// Errors raised while allocating the capture target.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// Requested size is zero or beyond the device's 2D texture limit.
    #[error("unsupported capture target size {width}x{height} (device maximum {max})")]
    UnsupportedSize { width: u32, height: u32, max: u32 },
}

/// Offscreen color + depth attachments sized in device pixels.
pub struct RenderTarget {
    pub color_texture: wgpu::Texture,
    pub color_view: wgpu::TextureView,
    pub depth_texture: wgpu::Texture,
    pub depth_view: wgpu::TextureView,
    size: PixelSize,
}

impl RenderTarget {
    /// Color format; guaranteed renderable and sampleable on every adapter.
    pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    /// Depth format, identical to the display depth buffer.
    pub const DEPTH_FORMAT: wgpu::TextureFormat = DepthBuffer::FORMAT;

    /// Allocate both attachments at `size`.
    pub fn new(device: &wgpu::Device, size: PixelSize) -> Result<Self, CaptureError> {
        let max = device.limits().max_texture_dimension_2d;
        if size.width == 0 || size.height == 0 || size.width > max || size.height > max {
            return Err(CaptureError::UnsupportedSize {
                width: size.width,
                height: size.height,
                max,
            });
        }

        let extent = wgpu::Extent3d {
            width: size.width,
            height: size.height,
            depth_or_array_layers: 1,
        };
        let usage = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;

        let color_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("capture-color"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::COLOR_FORMAT,
            usage,
            view_formats: &[],
        });
        let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("capture-depth"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage,
            view_formats: &[],
        });

        let color_view = color_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());

        log::debug!("Allocated capture target {}x{}", size.width, size.height);

        Ok(Self {
            color_texture,
            color_view,
            depth_texture,
            depth_view,
            size,
        })
    }

    /// Resize both attachments together.
    ///
    /// Returns `Ok(true)` when the attachments were reallocated and any bind
    /// group referencing them must be rebuilt, `Ok(false)` when `size` is
    /// unchanged. On error the previous attachments stay in place.
    pub fn resize(&mut self, device: &wgpu::Device, size: PixelSize) -> Result<bool, CaptureError> {
        if self.size == size {
            return Ok(false);
        }
        *self = Self::new(device, size)?;
        Ok(true)
    }

    pub fn size(&self) -> PixelSize {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }
}

/// View of captured scene depth handed to the water shader.
#[derive(Clone, Copy, Debug)]
pub enum DepthSource<'a> {
    /// Raw hardware depth values from the depth attachment.
    Hardware(&'a wgpu::TextureView),
    /// Packed depth written by the depth encoder into the color attachment.
    Packed(&'a wgpu::TextureView),
}

impl<'a> DepthSource<'a> {
    pub fn view(&self) -> &'a wgpu::TextureView {
        match self {
            DepthSource::Hardware(view) | DepthSource::Packed(view) => view,
        }
    }

    /// Bind group layout entry type matching this source.
    pub fn binding_type(&self) -> wgpu::BindingType {
        let sample_type = match self {
            DepthSource::Hardware(_) => wgpu::TextureSampleType::Depth,
            DepthSource::Packed(_) => wgpu::TextureSampleType::Float { filterable: false },
        };
        wgpu::BindingType::Texture {
            sample_type,
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        }
    }
}

/// The offscreen depth capture: a render target bound to a fixed [`DepthMode`].
pub struct DepthCapture {
    mode: DepthMode,
    target: RenderTarget,
}

impl DepthCapture {
    pub fn new(device: &wgpu::Device, mode: DepthMode, size: PixelSize) -> Result<Self, CaptureError> {
        let target = RenderTarget::new(device, size)?;
        log::info!(
            "Depth capture ready: {} depth, {}x{}",
            mode.label(),
            size.width,
            size.height
        );
        Ok(Self { mode, target })
    }

    pub fn mode(&self) -> DepthMode {
        self.mode
    }

    pub fn target(&self) -> &RenderTarget {
        &self.target
    }

    pub fn size(&self) -> PixelSize {
        self.target.size()
    }

    /// See [`RenderTarget::resize`].
    pub fn resize(&mut self, device: &wgpu::Device, size: PixelSize) -> Result<bool, CaptureError> {
        self.target.resize(device, size)
    }

    /// The depth produced by the most recent depth pass.
    pub fn depth_source(&self) -> DepthSource<'_> {
        match self.mode {
            DepthMode::HardwareTexture => DepthSource::Hardware(&self.target.depth_view),
            DepthMode::PackedColor => DepthSource::Packed(&self.target.color_view),
        }
    }

    /// Whether the depth pass needs a color attachment.
    ///
    /// In hardware mode the depth attachment is written as a side effect of
    /// rasterization and no color output is needed.
    pub fn writes_color(&self) -> bool {
        self.mode == DepthMode::PackedColor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::create_test_device;

    #[test]
    fn test_target_formats() {
        assert_eq!(RenderTarget::COLOR_FORMAT, wgpu::TextureFormat::Rgba8Unorm);
        assert_eq!(RenderTarget::DEPTH_FORMAT, wgpu::TextureFormat::Depth32Float);
    }

    #[test]
    fn test_target_dimensions_match_request() {
        let Some((_adapter, device, _queue)) = create_test_device() else {
            return;
        };
        let target = RenderTarget::new(&device, PixelSize::new(1600, 1200)).unwrap();
        assert_eq!(target.size(), PixelSize::new(1600, 1200));
        assert_eq!(target.color_texture.width(), 1600);
        assert_eq!(target.depth_texture.height(), 1200);
    }

    #[test]
    fn test_attachments_are_sampleable() {
        let Some((_adapter, device, _queue)) = create_test_device() else {
            return;
        };
        let target = RenderTarget::new(&device, PixelSize::new(64, 64)).unwrap();
        for usage in [target.color_texture.usage(), target.depth_texture.usage()] {
            assert!(usage.contains(wgpu::TextureUsages::RENDER_ATTACHMENT));
            assert!(usage.contains(wgpu::TextureUsages::TEXTURE_BINDING));
        }
    }

    #[test]
    fn test_resize_reallocates_both_attachments() {
        let Some((_adapter, device, _queue)) = create_test_device() else {
            return;
        };
        let mut target = RenderTarget::new(&device, PixelSize::new(800, 600)).unwrap();
        assert!(target.resize(&device, PixelSize::new(1024, 768)).unwrap());
        assert_eq!(target.color_texture.width(), 1024);
        assert_eq!(target.depth_texture.width(), 1024);
        assert_eq!(target.color_texture.height(), 768);
        assert_eq!(target.depth_texture.height(), 768);
    }

    #[test]
    fn test_resize_same_size_is_noop() {
        let Some((_adapter, device, _queue)) = create_test_device() else {
            return;
        };
        let mut target = RenderTarget::new(&device, PixelSize::new(800, 600)).unwrap();
        assert!(!target.resize(&device, PixelSize::new(800, 600)).unwrap());
        assert_eq!(target.size(), PixelSize::new(800, 600));
    }

    #[test]
    fn test_oversized_target_is_rejected() {
        let Some((_adapter, device, _queue)) = create_test_device() else {
            return;
        };
        let max = device.limits().max_texture_dimension_2d;
        let result = RenderTarget::new(&device, PixelSize::new(max + 1, 16));
        assert!(matches!(result, Err(CaptureError::UnsupportedSize { .. })));
    }

    #[test]
    fn test_failed_resize_keeps_previous_target() {
        let Some((_adapter, device, _queue)) = create_test_device() else {
            return;
        };
        let mut target = RenderTarget::new(&device, PixelSize::new(320, 240)).unwrap();
        let max = device.limits().max_texture_dimension_2d;
        assert!(target.resize(&device, PixelSize::new(16, max + 1)).is_err());
        assert_eq!(target.size(), PixelSize::new(320, 240));
    }

    #[test]
    fn test_depth_source_follows_mode() {
        let Some((_adapter, device, _queue)) = create_test_device() else {
            return;
        };
        let size = PixelSize::new(32, 32);
        let hardware = DepthCapture::new(&device, DepthMode::HardwareTexture, size).unwrap();
        assert!(matches!(hardware.depth_source(), DepthSource::Hardware(_)));
        assert!(!hardware.writes_color());

        let packed = DepthCapture::new(&device, DepthMode::PackedColor, size).unwrap();
        assert!(matches!(packed.depth_source(), DepthSource::Packed(_)));
        assert!(packed.writes_color());
    }
}
