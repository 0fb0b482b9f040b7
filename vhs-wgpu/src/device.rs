//! Headless device creation for offline rendering.

use crate::error::BackendError;

/// Request an adapter without a surface and open a device on it.
pub fn request_headless_device(
    label: &str,
) -> Result<(wgpu::Device, wgpu::Queue, wgpu::AdapterInfo), BackendError> {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });

    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .ok_or(BackendError::NoAdapter)?;

    let (device, queue) = pollster::block_on(adapter.request_device(
        &wgpu::DeviceDescriptor {
            label: Some(label),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: wgpu::MemoryHints::default(),
        },
        None,
    ))?;

    let info = adapter.get_info();
    log::info!("VHS device initialized: {} ({})", info.name, info.backend.to_str());
    Ok((device, queue, info))
}
