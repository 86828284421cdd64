//! Display-size tracking that keeps every size-dependent resource in step.
//!
//! Sizes are physical (logical size times the scale factor, as winit reports
//! them), clamped to at least 1×1. A [`ViewportChange`] is produced only when
//! that size actually changes.

/// Minimum dimension of any size-dependent resource (prevents zero-size textures).
pub const MIN_DIMENSION: u32 = 1;

/// Size in device pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// This size with each dimension raised to at least [`MIN_DIMENSION`].
    pub fn clamped(self) -> Self {
        Self {
            width: self.width.max(MIN_DIMENSION),
            height: self.height.max(MIN_DIMENSION),
        }
    }

    /// Size as the `vec2<f32>` the shaders consume.
    pub fn to_array(self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }
}

/// A new display size that every size-dependent resource must adopt together.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportChange {
    /// New size in device pixels.
    pub size: PixelSize,
    /// Scale factor in effect when the change was produced.
    pub scale_factor: f64,
}

/// Tracks the display surface size and scale factor.
#[derive(Debug, Clone)]
pub struct ViewportSync {
    size: PixelSize,
    scale_factor: f64,
    configured: bool,
}

impl ViewportSync {
    /// Start from the window's initial physical size.
    ///
    /// A zero initial size (Wayland before the first configure) is clamped and
    /// the viewport is marked unconfigured until the first real resize.
    pub fn new(physical_width: u32, physical_height: u32, scale_factor: f64) -> Self {
        Self {
            size: PixelSize::new(physical_width, physical_height).clamped(),
            scale_factor,
            configured: physical_width > 0 && physical_height > 0,
        }
    }

    /// Handle a physical resize. Returns `None` when nothing changed.
    pub fn handle_resize(&mut self, physical_width: u32, physical_height: u32) -> Option<ViewportChange> {
        let size = PixelSize::new(physical_width, physical_height).clamped();
        if size == self.size {
            return None;
        }
        self.size = size;
        self.configured = true;
        log::info!(
            "Viewport resized to {}x{} (scale {})",
            size.width,
            size.height,
            self.scale_factor
        );
        Some(ViewportChange {
            size,
            scale_factor: self.scale_factor,
        })
    }

    /// Handle a DPI change; the physical size usually changes with it.
    pub fn handle_scale_factor_changed(
        &mut self,
        scale_factor: f64,
        physical_width: u32,
        physical_height: u32,
    ) -> Option<ViewportChange> {
        self.scale_factor = scale_factor;
        self.handle_resize(physical_width, physical_height)
    }

    pub fn size(&self) -> PixelSize {
        self.size
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Whether a non-zero size has been seen.
    pub fn is_configured(&self) -> bool {
        self.configured
    }
}
