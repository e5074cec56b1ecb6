/// Identifies the hardware backend an operator runs on.
///
/// Every `OperatorDef` carries a device; a net built under a device scope
/// stamps that device onto each operator it adds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceType {
    /// Execution on the host CPU. This is the default device.
    #[default]
    Cpu,
    /// Execution on a CUDA-enabled NVIDIA GPU.
    ///
    /// **Note:** GPU kernels are planned for a later phase; today only the
    /// device tag exists.
    Cuda,
    /// Execution on a ROCm/HIP AMD GPU. Same status as `Cuda`.
    Hip,
    // TODO: Metal (Apple Silicon) once a second backend exists to generalize over.
}

impl DeviceType {
    /// True for the accelerator variants.
    pub fn is_gpu(&self) -> bool {
        matches!(self, DeviceType::Cuda | DeviceType::Hip)
    }
}

/// Number of usable GPU devices.
///
/// The CPU-only build always reports 0. When the `gpu` feature grows real
/// kernels this will query the driver instead.
pub fn num_gpu_devices() -> usize {
    0
}

/// The GPU device kinds that are actually usable in this build, in the order
/// a device-sweeping test should try them. Empty while `num_gpu_devices()`
/// is 0.
pub fn available_gpu_kinds() -> Vec<DeviceType> {
    Vec::new()
}
