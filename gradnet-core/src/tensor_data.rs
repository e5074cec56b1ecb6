// src/tensor_data.rs
use std::sync::Arc;

use crate::buffer::{Buffer, CpuBuffer};
use crate::device::DeviceType;
use crate::error::GradNetError;
use crate::tensor::utils::calculate_strides;
use crate::types::DType;

/// Internal storage and metadata for a Tensor.
///
/// Holds the actual data buffer, shape, strides, device and data type.
/// It is wrapped in `Arc<RwLock<TensorData>>` by the `Tensor` struct to
/// allow shared ownership and interior mutability. Gradients are not stored
/// here: in this runtime they are ordinary workspace blobs produced by
/// generated gradient operators.
#[derive(Debug)]
pub struct TensorData {
    /// The underlying data buffer holding typed data. Wrapped in Arc for
    /// cheap sharing by views.
    pub(crate) buffer: Arc<Buffer>,
    /// The device where the buffer resides.
    pub(crate) device: DeviceType,
    /// The data type of the elements in the buffer.
    pub(crate) dtype: DType,
    /// The shape (dimensions) of the tensor.
    pub(crate) shape: Vec<usize>,
    /// The strides for each dimension. Strides define the jump in memory
    /// required to move one step along a given dimension.
    pub(crate) strides: Vec<usize>,
    /// The offset into the buffer for the first element (used for views).
    pub(crate) offset: usize,
}

impl TensorData {
    /// Creates a new `TensorData` with the given f32 data and shape on the CPU.
    ///
    /// Takes ownership of the data vector and calculates contiguous strides.
    ///
    /// # Errors
    /// Returns `GradNetError::TensorCreationError` if the length of `data_vec`
    /// does not match the number of elements specified by `shape`.
    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, GradNetError> {
        let numel: usize = shape.iter().product();
        let data_len = data_vec.len();
        if data_len != numel {
            return Err(GradNetError::TensorCreationError { data_len, shape });
        }

        let strides = calculate_strides(&shape);
        let buffer = Buffer::Cpu(CpuBuffer::F32(Arc::new(data_vec)));

        Ok(TensorData {
            buffer: Arc::new(buffer),
            device: DeviceType::Cpu,
            dtype: DType::F32,
            offset: 0,
            shape,
            strides,
        })
    }

    /// Creates a new `TensorData` with the given f64 data and shape on the CPU.
    ///
    /// Similar to `new`, but for `f64` data.
    pub fn new_f64(data_vec: Vec<f64>, shape: Vec<usize>) -> Result<Self, GradNetError> {
        let numel: usize = shape.iter().product();
        let data_len = data_vec.len();
        if data_len != numel {
            return Err(GradNetError::TensorCreationError { data_len, shape });
        }

        let strides = calculate_strides(&shape);
        let buffer = Buffer::Cpu(CpuBuffer::F64(Arc::new(data_vec)));

        Ok(TensorData {
            buffer: Arc::new(buffer),
            device: DeviceType::Cpu,
            dtype: DType::F64,
            offset: 0,
            shape,
            strides,
        })
    }

    /// Creates a new `TensorData` representing a view of an existing buffer.
    /// Used internally by reshape operators (`PrependDim`, `MergeDim`,
    /// `ResizeLike`).
    ///
    /// Does **not** allocate new memory: it shares `buffer_arc` and sets new
    /// metadata (offset, shape, strides).
    pub(crate) fn new_view(
        buffer_arc: Arc<Buffer>,
        device: DeviceType,
        offset: usize,
        shape: Vec<usize>,
        strides: Vec<usize>,
    ) -> Result<Self, GradNetError> {
        let dtype = match &*buffer_arc {
            Buffer::Cpu(CpuBuffer::F32(_)) => DType::F32,
            Buffer::Cpu(CpuBuffer::F64(_)) => DType::F64,
            Buffer::Gpu { device, .. } => {
                return Err(GradNetError::UnsupportedDevice {
                    device: *device,
                    op_type: "new_view".to_string(),
                });
            }
        };

        if device.is_gpu() {
            return Err(GradNetError::UnsupportedDevice {
                device,
                op_type: "new_view".to_string(),
            });
        }

        Ok(TensorData {
            buffer: buffer_arc,
            device,
            dtype,
            offset,
            shape,
            strides,
        })
    }

    /// Provides immutable access to the underlying shared data buffer.
    pub fn buffer(&self) -> &Arc<Buffer> {
        &self.buffer
    }

    /// Number of elements in the tensor. Only depends on the shape.
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// Checks if the tensor is contiguous in memory.
    /// A tensor is contiguous if its elements are laid out in standard
    /// row-major order without gaps, considering its strides.
    pub fn is_contiguous(&self) -> bool {
        if self.shape.is_empty() {
            return true;
        }
        let mut current_stride = 1;
        for i in (0..self.shape.len()).rev() {
            let shape_i = self.shape[i];
            if shape_i == 0 {
                return true;
            }
            if shape_i != 1 {
                if self.strides[i] != current_stride {
                    return false;
                }
                current_stride *= shape_i;
            }
        }
        true
    }
}
