//! Scene depth representation: source selection, packing, and view-space reconstruction.
//!
//! Depth uses the standard convention where the near plane maps to 0.0 and the
//! far plane to 1.0. When the adapter cannot sample a hardware depth texture,
//! the depth pass packs normalized depth into the four 8-bit channels of an
//! `Rgba8Unorm` color target instead. The functions here mirror
//! `shaders/packing.wgsl` so the foam rule can be checked on the CPU.

/// Weights applied to depth before taking the fractional part of each channel.
pub const PACK_FACTORS: [f32; 4] = [1.0, 255.0, 65025.0, 16581375.0];

/// Weights that recombine the four channels into one depth value.
pub const UNPACK_FACTORS: [f32; 4] = [1.0, 1.0 / 255.0, 1.0 / 65025.0, 1.0 / 16581375.0];

/// Largest depth that survives packing. 1.0 itself would wrap every channel to zero.
pub const MAX_PACKED_DEPTH: f32 = 0.999_999_9;

/// Color the capture target is cleared to; decodes to the far plane.
pub const PACKED_CLEAR_COLOR: wgpu::Color = wgpu::Color::WHITE;

/// Caller preference for how scene depth reaches the water shader.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DepthPreference {
    /// Use the hardware depth texture when the adapter can sample it.
    #[default]
    Auto,
    /// Always pack depth into a color target.
    Packed,
}

/// The depth source chosen for the whole session.
///
/// Decided once at startup; every shader variant and bind group is built
/// against this choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DepthMode {
    /// The water shader samples the capture target's depth attachment directly.
    HardwareTexture,
    /// The depth pass writes packed depth into the capture target's color attachment.
    PackedColor,
}

impl DepthMode {
    /// Pick the depth mode for `adapter`, honouring `preference`.
    pub fn detect(adapter: &wgpu::Adapter, preference: DepthPreference) -> Self {
        let features = adapter.get_texture_format_features(DepthBuffer::FORMAT);
        let backend = adapter.get_info().backend;
        let mode = Self::select(preference, features.allowed_usages, backend);
        log::debug!(
            "Depth source: {:?} (preference {:?}, backend {:?})",
            mode,
            preference,
            backend
        );
        mode
    }

    /// Pure selection rule used by [`DepthMode::detect`].
    ///
    /// The GL backend reports depth textures as sampleable but its shader
    /// translation cannot `textureLoad` from them, so it always packs.
    pub fn select(
        preference: DepthPreference,
        depth_usages: wgpu::TextureUsages,
        backend: wgpu::Backend,
    ) -> Self {
        let sampleable = depth_usages
            .contains(wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING);
        let loadable = backend != wgpu::Backend::Gl;
        match preference {
            DepthPreference::Auto if sampleable && loadable => DepthMode::HardwareTexture,
            _ => DepthMode::PackedColor,
        }
    }

    /// Value of the `DEPTH_PACKING` shader constant for this mode.
    pub fn packing_define(self) -> u32 {
        match self {
            DepthMode::HardwareTexture => 0,
            DepthMode::PackedColor => 1,
        }
    }

    /// Short name used in labels and logs.
    pub fn label(self) -> &'static str {
        match self {
            DepthMode::HardwareTexture => "hardware",
            DepthMode::PackedColor => "packed",
        }
    }
}

fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Pack normalized depth into four channels in `[0, 1)`.
///
/// Inputs are clamped to `[0, MAX_PACKED_DEPTH]`.
pub fn pack_depth(depth: f32) -> [f32; 4] {
    let v = depth.clamp(0.0, MAX_PACKED_DEPTH);
    let enc = PACK_FACTORS.map(|factor| fract(v * factor));
    [
        enc[0] - enc[1] / 255.0,
        enc[1] - enc[2] / 255.0,
        enc[2] - enc[3] / 255.0,
        enc[3],
    ]
}

/// Recombine packed channels into normalized depth, clamped to at most 1.0.
pub fn unpack_depth(texel: [f32; 4]) -> f32 {
    let sum: f32 = texel
        .iter()
        .zip(UNPACK_FACTORS.iter())
        .map(|(c, w)| c * w)
        .sum();
    sum.min(1.0)
}

/// Store packed channels the way an `Rgba8Unorm` target does.
pub fn quantize_rgba8(channels: [f32; 4]) -> [u8; 4] {
    channels.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// Read `Rgba8Unorm` bytes back as normalized channels.
pub fn dequantize_rgba8(bytes: [u8; 4]) -> [f32; 4] {
    bytes.map(|b| f32::from(b) / 255.0)
}

/// Convert normalized perspective depth into view-space z (negative in front of the camera).
///
/// Written as a blend of the planes so depth 0.0 and 1.0 land exactly on
/// `-near` and `-far` in f32.
pub fn perspective_depth_to_view_z(depth: f32, near: f32, far: f32) -> f32 {
    -(near * far) / (far * (1.0 - depth) + near * depth)
}

/// Inverse of [`perspective_depth_to_view_z`].
pub fn view_z_to_perspective_depth(view_z: f32, near: f32, far: f32) -> f32 {
    ((near + view_z) * far) / ((far - near) * view_z)
}

/// Depth attachment for the composite pass that draws to the display.
pub struct DepthBuffer {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub format: wgpu::TextureFormat,
    width: u32,
    height: u32,
}

impl DepthBuffer {
    /// 32-bit float depth, shared with the capture target.
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Standard-Z clear value: 1.0 is the far plane.
    pub const CLEAR_VALUE: f32 = 1.0;

    /// Standard-Z comparison: closer fragments have smaller depth.
    pub const COMPARE_FUNCTION: wgpu::CompareFunction = wgpu::CompareFunction::Less;

    /// Create a new depth buffer with the specified dimensions.
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("display-depth-buffer"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            format: Self::FORMAT,
            width,
            height,
        }
    }

    /// Resize the depth buffer. No-op if dimensions are unchanged.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if self.width == width && self.height == height {
            return;
        }
        *self = Self::new(device, width, height);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::create_test_device;

    const NEAR: f32 = 0.1;
    const FAR: f32 = 100.0;

    fn roundtrip_through_rgba8(depth: f32) -> f32 {
        unpack_depth(dequantize_rgba8(quantize_rgba8(pack_depth(depth))))
    }

    #[test]
    fn test_packed_depth_survives_8bit_storage() {
        for i in 0..=1000 {
            let depth = i as f32 / 1000.0 * MAX_PACKED_DEPTH;
            let decoded = roundtrip_through_rgba8(depth);
            assert!(
                (decoded - depth).abs() < 1.0 / 255.0,
                "depth {depth} decoded as {decoded}"
            );
        }
    }

    #[test]
    fn test_packing_is_far_more_precise_than_one_channel() {
        let depth = 0.987_654_3;
        let decoded = roundtrip_through_rgba8(depth);
        assert!((decoded - depth).abs() < 1e-5, "decoded {decoded}");
    }

    #[test]
    fn test_packed_channels_stay_in_unit_range() {
        for depth in [0.0, 0.25, 0.5, 0.75, 0.999, 1.0, 2.0, -1.0] {
            for c in pack_depth(depth) {
                assert!((-1.0 / 255.0..1.0).contains(&c), "channel {c} for depth {depth}");
            }
        }
    }

    #[test]
    fn test_unit_depth_does_not_wrap_to_near() {
        // 1.0 would pack to all zeros without the clamp.
        let decoded = roundtrip_through_rgba8(1.0);
        assert!(decoded > 0.999, "decoded {decoded}");
    }

    #[test]
    fn test_white_clear_decodes_to_far_plane() {
        let c = PACKED_CLEAR_COLOR;
        let decoded = unpack_depth([c.r as f32, c.g as f32, c.b as f32, c.a as f32]);
        assert_eq!(decoded, 1.0);
        let z = perspective_depth_to_view_z(decoded, NEAR, FAR);
        assert!((z + FAR).abs() < 1e-3);
    }

    #[test]
    fn test_view_z_reconstruction_at_planes() {
        assert!((perspective_depth_to_view_z(0.0, NEAR, FAR) + NEAR).abs() < 1e-6);
        assert!((perspective_depth_to_view_z(1.0, NEAR, FAR) + FAR).abs() < 1e-3);
    }

    #[test]
    fn test_far_plane_is_exact_for_common_ranges() {
        for (near, far) in [(0.1, 100.0), (0.01, 1000.0), (0.5, 50.0), (1.0, 10_000.0)] {
            let z = perspective_depth_to_view_z(1.0, near, far);
            assert!((z + far).abs() <= far * 1e-6, "far {far} reconstructed as {z}");
            let z = perspective_depth_to_view_z(0.0, near, far);
            assert!((z + near).abs() <= near * 1e-6, "near {near} reconstructed as {z}");
        }
    }

    #[test]
    fn test_view_z_roundtrip() {
        for z in [-0.5_f32, -1.0, -5.0, -7.0, -42.0, -99.0] {
            let depth = view_z_to_perspective_depth(z, NEAR, FAR);
            assert!((0.0..=1.0).contains(&depth));
            let back = perspective_depth_to_view_z(depth, NEAR, FAR);
            assert!((back - z).abs() < z.abs() * 1e-3, "{z} came back as {back}");
        }
    }

    #[test]
    fn test_reconstruction_matches_glam_projection() {
        let proj = glam::Mat4::perspective_rh(70f32.to_radians(), 16.0 / 9.0, NEAR, FAR);
        let clip = proj * glam::Vec4::new(0.0, 0.0, -5.0, 1.0);
        let ndc_z = clip.z / clip.w;
        assert!((ndc_z - view_z_to_perspective_depth(-5.0, NEAR, FAR)).abs() < 1e-5);
        assert!((perspective_depth_to_view_z(ndc_z, NEAR, FAR) + 5.0).abs() < 1e-2);
    }

    #[test]
    fn test_select_prefers_hardware_when_sampleable() {
        let usages = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
        assert_eq!(
            DepthMode::select(DepthPreference::Auto, usages, wgpu::Backend::Vulkan),
            DepthMode::HardwareTexture
        );
        assert_eq!(
            DepthMode::select(DepthPreference::Auto, usages, wgpu::Backend::Metal),
            DepthMode::HardwareTexture
        );
    }

    #[test]
    fn test_select_packs_on_gl_even_when_sampleable() {
        assert_eq!(
            DepthMode::select(
                DepthPreference::Auto,
                wgpu::TextureUsages::all(),
                wgpu::Backend::Gl
            ),
            DepthMode::PackedColor
        );
    }

    #[test]
    fn test_select_falls_back_to_packed() {
        assert_eq!(
            DepthMode::select(
                DepthPreference::Auto,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
                wgpu::Backend::Vulkan
            ),
            DepthMode::PackedColor
        );
        assert_eq!(
            DepthMode::select(
                DepthPreference::Packed,
                wgpu::TextureUsages::all(),
                wgpu::Backend::Vulkan
            ),
            DepthMode::PackedColor
        );
    }

    #[test]
    fn test_packing_define_values() {
        assert_eq!(DepthMode::HardwareTexture.packing_define(), 0);
        assert_eq!(DepthMode::PackedColor.packing_define(), 1);
    }

    #[test]
    fn test_standard_z_constants() {
        assert_eq!(DepthBuffer::CLEAR_VALUE, 1.0);
        assert_eq!(DepthBuffer::COMPARE_FUNCTION, wgpu::CompareFunction::Less);
        assert_eq!(DepthBuffer::FORMAT, wgpu::TextureFormat::Depth32Float);
    }

    #[test]
    fn test_display_depth_resize() {
        let Some((_adapter, device, _queue)) = create_test_device() else {
            return;
        };
        let mut depth = DepthBuffer::new(&device, 800, 600);
        depth.resize(&device, 1920, 1080);
        assert_eq!((depth.width(), depth.height()), (1920, 1080));
        depth.resize(&device, 1920, 1080);
        assert_eq!((depth.width(), depth.height()), (1920, 1080));
    }
}
