use std::sync::Arc;

use crate::device::DeviceType;
use crate::error::GradNetError;

/// Enum representing different buffer types based on device and data type.
/// This allows TensorData to hold different kinds of data buffers.
#[derive(Debug, Clone)]
pub enum Buffer {
    /// Data resides on the CPU.
    Cpu(CpuBuffer),
    /// Placeholder for GPU buffers. Stores device and length; the actual
    /// device handle would live in a dedicated GPU memory manager.
    Gpu { device: DeviceType, len: usize },
}

/// Enum for CPU-specific buffer types.
#[derive(Debug, Clone)]
pub enum CpuBuffer {
    /// Buffer holding f32 data on the CPU.
    F32(Arc<Vec<f32>>),
    /// Buffer holding f64 data on the CPU.
    F64(Arc<Vec<f64>>),
}

impl Buffer {
    /// Number of elements in the buffer.
    pub fn len(&self) -> usize {
        match self {
            Buffer::Cpu(CpuBuffer::F32(data)) => data.len(),
            Buffer::Cpu(CpuBuffer::F64(data)) => data.len(),
            Buffer::Gpu { len, .. } => *len,
        }
    }

    /// True if the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attempts to get a reference to the underlying `Arc<Vec<f32>>` if this
    /// is a CPU F32 buffer.
    pub fn try_get_cpu_f32(&self) -> Result<&Arc<Vec<f32>>, GradNetError> {
        match self {
            Buffer::Cpu(CpuBuffer::F32(data_arc)) => Ok(data_arc),
            Buffer::Cpu(_) => Err(GradNetError::DTypeMismatch {
                operation: "try_get_cpu_f32".to_string(),
            }),
            Buffer::Gpu { device, .. } => Err(GradNetError::UnsupportedDevice {
                device: *device,
                op_type: "try_get_cpu_f32".to_string(),
            }),
        }
    }

    /// Attempts to get a reference to the underlying `Arc<Vec<f64>>` if this
    /// is a CPU F64 buffer.
    pub fn try_get_cpu_f64(&self) -> Result<&Arc<Vec<f64>>, GradNetError> {
        match self {
            Buffer::Cpu(CpuBuffer::F64(data_arc)) => Ok(data_arc),
            Buffer::Cpu(_) => Err(GradNetError::DTypeMismatch {
                operation: "try_get_cpu_f64".to_string(),
            }),
            Buffer::Gpu { device, .. } => Err(GradNetError::UnsupportedDevice {
                device: *device,
                op_type: "try_get_cpu_f64".to_string(),
            }),
        }
    }
}
