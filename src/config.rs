//! Runtime backend selection.

/// Which device drives the strips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Backend {
    /// Engine paints a pixel buffer that is streamed out every tick.
    #[default]
    Software,

    /// Recurring patterns run in controller animation slots.
    Firmware,
}

/// How the surrounding program is executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunMode {
    /// Driving real hardware.
    #[default]
    Normal,

    /// Replaying recorded inputs or running in simulation.
    Replay,
}

/// Device selection for a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    pub backend: Backend,
    pub mode: RunMode,
}

impl DeviceConfig {
    pub const fn new(backend: Backend, mode: RunMode) -> Self {
        Self { backend, mode }
    }

    /// Backend actually used: replay always runs in software.
    pub fn effective_backend(&self) -> Backend {
        match (self.mode, self.backend) {
            (RunMode::Replay, Backend::Firmware) => {
                info!("replay mode: using software backend instead of firmware");
                Backend::Software
            }
            (_, backend) => backend,
        }
    }
}
