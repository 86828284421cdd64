//! The flow-distortion texture sampled by the water shader.
//!
//! Loaded once at startup and never modified. Sampling wraps in both axes so
//! the time-scrolled UVs tile seamlessly.

use std::path::Path;

/// Errors that can occur while creating the flow texture.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    /// The image file could not be opened or decoded.
    #[error("failed to load flow texture: {0}")]
    Load(#[from] image::ImageError),

    /// Pixel data length doesn't match the expected size for the given dimensions.
    #[error("texture data size ({actual}) does not match expected ({expected}) for {width}x{height}")]
    DataSizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
    },

    /// Width or height is zero.
    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },
}

/// Edge length of the generated pattern.
pub const PROCEDURAL_FLOW_SIZE: u32 = 256;

/// Tileable flow-distortion texture with a repeating sampler.
pub struct FlowTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    dimensions: (u32, u32),
}

impl FlowTexture {
    /// Distortion values are data, not color, so no sRGB decode.
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    /// Load a PNG or JPEG from disk.
    pub fn from_file(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
    ) -> Result<Self, TextureError> {
        let image = image::open(path)?.to_rgba8();
        let (width, height) = image.dimensions();
        log::info!("Loaded flow texture {} ({}x{})", path.display(), width, height);
        Self::from_rgba8(device, queue, width, height, image.as_raw())
    }

    /// Generate the built-in tileable pattern.
    pub fn procedural(device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Self, TextureError> {
        let size = PROCEDURAL_FLOW_SIZE;
        Self::from_rgba8(device, queue, size, size, &procedural_flow_pattern(size))
    }

    /// Upload tightly packed RGBA8 pixels.
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::ZeroDimensions { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(TextureError::DataSizeMismatch {
                actual: data.len(),
                expected,
                width,
                height,
            });
        }

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("flow-texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("flow-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Ok(Self {
            texture,
            view,
            sampler,
            dimensions: (width, height),
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }
}

/// Tileable RGBA8 distortion pattern centred on mid-grey.
///
/// Red and green carry the distortion (±0.15 around 0.5); blue is 0.5, alpha 1.
/// All frequencies are whole cycles per tile, so opposite edges match.
pub fn procedural_flow_pattern(size: u32) -> Vec<u8> {
    use std::f32::consts::TAU;

    let mut data = Vec::with_capacity(size as usize * size as usize * 4);
    let n = size as f32;
    for y in 0..size {
        for x in 0..size {
            let u = x as f32 / n;
            let v = y as f32 / n;
            let r = 0.5
                + 0.09 * (TAU * (2.0 * u + v)).sin()
                + 0.06 * (TAU * (5.0 * v - 3.0 * u)).cos();
            let g = 0.5
                + 0.09 * (TAU * (3.0 * v - u)).cos()
                + 0.06 * (TAU * (4.0 * u + 2.0 * v)).sin();
            data.extend_from_slice(&[to_unorm8(r), to_unorm8(g), 128, 255]);
        }
    }
    data
}

fn to_unorm8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}
