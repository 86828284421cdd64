//! Per-frame pass ordering.
//!
//! Each frame runs exactly two passes: a depth pass into the offscreen
//! capture target with the water hidden and the depth override installed,
//! then a composite pass to the display with the water drawn from a fresh
//! uniform snapshot. Pass state travels in an explicit [`PassConfig`] value
//! rather than being toggled on shared scene objects, so nothing has to be
//! restored afterwards.

use std::time::Instant;

use crate::depth::DepthMode;
use crate::water::{ParameterSource, WaterParams, WaterUniforms};

/// The two phases of a frame, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FramePhase {
    DepthPass,
    CompositePass,
}

/// Where a pass renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassTarget {
    /// The depth capture render target.
    Offscreen,
    /// The swapchain surface.
    Display,
}

/// Material that replaces every scene object's own material for one pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverrideMaterial {
    /// Objects draw with their own material.
    None,
    /// Depth-only pipeline; the hardware depth attachment is the output.
    DepthOnly,
    /// Depth encoder writing packed depth into the capture color.
    PackedDepth,
}

impl OverrideMaterial {
    /// Override used by the depth pass for `mode`.
    pub fn for_depth_pass(mode: DepthMode) -> Self {
        match mode {
            DepthMode::HardwareTexture => OverrideMaterial::DepthOnly,
            DepthMode::PackedColor => OverrideMaterial::PackedDepth,
        }
    }
}

/// Whether the water surface takes part in a pass.
///
/// The visible variant carries the uniforms to draw with, so a visible water
/// surface can never be drawn with a stale snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WaterDraw<'a> {
    Hidden,
    Visible(&'a WaterUniforms),
}

/// Complete description of one render pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PassConfig<'a> {
    pub phase: FramePhase,
    pub target: PassTarget,
    pub override_material: OverrideMaterial,
    pub water: WaterDraw<'a>,
}

impl<'a> PassConfig<'a> {
    pub fn depth_pass(mode: DepthMode) -> Self {
        Self {
            phase: FramePhase::DepthPass,
            target: PassTarget::Offscreen,
            override_material: OverrideMaterial::for_depth_pass(mode),
            water: WaterDraw::Hidden,
        }
    }

    pub fn composite_pass(uniforms: &'a WaterUniforms) -> Self {
        Self {
            phase: FramePhase::CompositePass,
            target: PassTarget::Display,
            override_material: OverrideMaterial::None,
            water: WaterDraw::Visible(uniforms),
        }
    }

    pub fn water_visible(&self) -> bool {
        matches!(self.water, WaterDraw::Visible(_))
    }
}

/// Renders one configured pass.
pub trait PassExecutor {
    fn execute(&mut self, pass: &PassConfig<'_>);
}

/// Monotonic animation clock in seconds since start.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    time: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self { start, time: 0.0 }
    }

    /// Seconds since start as of the last advance.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Advance to the wall clock.
    pub fn advance(&mut self) -> f32 {
        self.advance_to(Instant::now())
    }

    /// Advance to `now`; never moves backwards.
    pub fn advance_to(&mut self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.start).as_secs_f32();
        self.time = self.time.max(elapsed);
        self.time
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of one scheduled frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    /// Zero-based index of the frame just rendered.
    pub frame_index: u64,
    /// Animation time the composite pass was drawn with.
    pub time: f32,
}

/// Drives the depth pass and the composite pass in order, once per frame.
pub struct FrameScheduler {
    mode: DepthMode,
    clock: FrameClock,
    frames: u64,
}

impl FrameScheduler {
    pub fn new(mode: DepthMode) -> Self {
        Self::with_clock(mode, FrameClock::new())
    }

    pub fn with_clock(mode: DepthMode, clock: FrameClock) -> Self {
        Self {
            mode,
            clock,
            frames: 0,
        }
    }

    /// Run one frame.
    ///
    /// `snapshot` turns the time and the freshly polled parameters into the
    /// composite uniforms; it runs after the depth pass and before the
    /// composite pass.
    pub fn run_frame<E, P>(
        &mut self,
        executor: &mut E,
        params: &mut P,
        snapshot: impl FnOnce(f32, &WaterParams) -> WaterUniforms,
    ) -> FrameReport
    where
        E: PassExecutor + ?Sized,
        P: ParameterSource + ?Sized,
    {
        let time = self.clock.time();

        executor.execute(&PassConfig::depth_pass(self.mode));

        let current = params.current();
        let uniforms = snapshot(time, &current);
        executor.execute(&PassConfig::composite_pass(&uniforms));

        self.clock.advance();
        let report = FrameReport {
            frame_index: self.frames,
            time,
        };
        self.frames += 1;
        report
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn mode(&self) -> DepthMode {
        self.mode
    }
}
