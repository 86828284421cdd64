//! Window creation and event handling via winit.
//!
//! [`App`] implements winit's [`ApplicationHandler`]: it creates the window
//! and the [`WaterRenderer`] on resume, routes size and DPI changes through
//! [`ViewportSync`], and renders one frame per redraw.

use std::sync::Arc;
use std::time::Instant;

use foamline_config::Config;
use foamline_render::{
    FrameReport, SurfaceError, ViewportChange, ViewportSync, WaterRenderer,
    init_render_context_blocking,
};
use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::error::EventLoopError;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::params::LiveParams;
use crate::scene_setup::demo_scene;
use crate::settings::renderer_settings;

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    let attrs = WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ));
    if config.window.fullscreen {
        attrs.with_fullscreen(Some(Fullscreen::Borderless(None)))
    } else {
        attrs
    }
}

/// Periodic frame-time logging. An interval of 0 disables it.
#[derive(Debug)]
pub struct FrameStats {
    interval: u64,
    window_start: Instant,
    frames_in_window: u64,
}

impl FrameStats {
    pub fn new(interval: u64) -> Self {
        Self {
            interval,
            window_start: Instant::now(),
            frames_in_window: 0,
        }
    }

    /// Count a frame; returns the average FPS when a reporting window closes.
    pub fn record(&mut self, report: &FrameReport, now: Instant) -> Option<f64> {
        if self.interval == 0 {
            return None;
        }
        self.frames_in_window += 1;
        if self.frames_in_window < self.interval {
            return None;
        }
        let elapsed = now
            .saturating_duration_since(self.window_start)
            .as_secs_f64();
        let fps = if elapsed > 0.0 {
            self.frames_in_window as f64 / elapsed
        } else {
            0.0
        };
        info!(
            "Frame {}: {:.1} fps over {} frames (t = {:.2}s)",
            report.frame_index, fps, self.frames_in_window, report.time
        );
        self.window_start = now;
        self.frames_in_window = 0;
        Some(fps)
    }
}

pub struct App {
    params: LiveParams,
    window: Option<Arc<Window>>,
    renderer: Option<WaterRenderer>,
    viewport: ViewportSync,
    stats: FrameStats,
}

impl App {
    pub fn new(params: LiveParams) -> Self {
        let config = params.config();
        let stats = FrameStats::new(config.debug.frame_stats_interval);
        Self {
            viewport: ViewportSync::new(config.window.width, config.window.height, 1.0),
            params,
            window: None,
            renderer: None,
            stats,
        }
    }

    fn apply_viewport_change(&mut self, event_loop: &ActiveEventLoop, change: ViewportChange) {
        let Some(renderer) = &mut self.renderer else {
            return;
        };
        if let Err(e) = renderer.apply_viewport_change(&change) {
            error!(
                "Failed to resize to {}x{}: {e}",
                change.size.width, change.size.height
            );
            event_loop.exit();
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(renderer) = &mut self.renderer else {
            return;
        };
        if !self.viewport.is_configured() {
            return;
        }

        // Disk reads happen here, between frames, never inside a pass.
        self.params.poll(Instant::now());

        match renderer.render_frame(&mut self.params) {
            Ok(report) => {
                self.stats.record(&report, Instant::now());
            }
            Err(SurfaceError::Lost) => {
                warn!("Surface lost after recovery attempt, reconfiguring");
                renderer.reconfigure_surface();
            }
            Err(SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                event_loop.exit();
                return;
            }
            Err(SurfaceError::Timeout) => {
                warn!("Surface timeout, skipping frame");
            }
        }

        // Fog edits take effect from the next frame.
        if let Some(fog) = self.params.take_fog_change() {
            renderer.set_fog(&fog);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = window_attributes_from_config(self.params.config());
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let inner_size = window.inner_size();
        self.viewport = ViewportSync::new(inner_size.width, inner_size.height, window.scale_factor());
        let size = self.viewport.size();
        info!(
            "Window created: {}x{} (scale: {:.2})",
            size.width,
            size.height,
            self.viewport.scale_factor()
        );

        let vsync = self.params.config().window.vsync;
        let ctx = match init_render_context_blocking(window.clone(), vsync) {
            Ok(ctx) => ctx,
            Err(e) => {
                error!("GPU initialization failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let settings = renderer_settings(self.params.config());
        match WaterRenderer::new(ctx, &demo_scene(), settings) {
            Ok(renderer) => self.renderer = Some(renderer),
            Err(e) => {
                error!("Renderer initialization failed: {e}");
                event_loop.exit();
                return;
            }
        }

        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(change) = self
                    .viewport
                    .handle_resize(new_size.width, new_size.height)
                {
                    self.apply_viewport_change(event_loop, change);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                // The new physical size is read back from the window after the change
                let Some(window) = &self.window else {
                    return;
                };
                let inner = window.inner_size();
                if let Some(change) = self.viewport.handle_scale_factor_changed(
                    scale_factor,
                    inner.width,
                    inner.height,
                ) {
                    self.apply_viewport_change(event_loop, change);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Creates an event loop and runs the application until the window closes.
pub fn run(params: LiveParams) -> Result<(), EventLoopError> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new(params);
    event_loop.run_app(&mut app)
}
