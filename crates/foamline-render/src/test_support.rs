//! Headless device creation for GPU-backed unit tests.

/// Request an adapter, device and queue without a surface.
///
/// Returns `None` on machines without a usable adapter so GPU tests can
/// return early instead of failing.
pub(crate) fn create_test_device() -> Option<(wgpu::Adapter, wgpu::Device, wgpu::Queue)> {
    pollster::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok()?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .ok()?;

        Some((adapter, device, queue))
    })
}
