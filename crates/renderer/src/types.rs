/// Adapter power preference requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpuPowerPreference {
    Low,
    #[default]
    High,
}

/// Allocation strategy hint forwarded to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpuMemoryMode {
    /// Favour a small memory footprint.
    #[default]
    Balanced,
    /// Favour allocation speed.
    Performance,
}

/// Immutable configuration for headless device acquisition and uploads.
#[derive(Debug, Clone, Copy)]
pub struct RendererConfig {
    pub power: GpuPowerPreference,
    pub memory: GpuMemoryMode,
    /// Allocate and fill a full mip chain for every photo texture.
    pub mipmaps: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            power: GpuPowerPreference::default(),
            memory: GpuMemoryMode::default(),
            mipmaps: true,
        }
    }
}

/// What we learned about the adapter, kept for logging and diagnostics.
#[derive(Debug, Clone)]
pub struct AdapterProfile {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
    pub max_texture_dimension: u32,
}

impl AdapterProfile {
    pub fn from_wgpu(info: &wgpu::AdapterInfo, limits: &wgpu::Limits) -> Self {
        Self {
            name: info.name.clone(),
            backend: info.backend,
            device_type: info.device_type,
            max_texture_dimension: limits.max_texture_dimension_2d,
        }
    }

    pub fn is_software(&self) -> bool {
        matches!(self.device_type, wgpu::DeviceType::Cpu)
    }
}
