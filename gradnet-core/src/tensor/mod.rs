// src/tensor/mod.rs

use crate::device::DeviceType;
use crate::error::GradNetError;
use crate::tensor_data::TensorData;
use crate::types::DType;
use std::sync::{Arc, RwLock};

pub mod create;
pub mod utils;

// Re-export creation functions so they are usable as `tensor::zeros(...)`.
pub use create::{full, ones, rand, randn, zeros, zeros_like};

/// Represents a multi-dimensional array (tensor).
///
/// `Tensor` uses `Arc<RwLock<TensorData>>` internally to allow for:
/// 1.  **Shared Ownership:** Multiple `Tensor` handles can point to the same
///     underlying data without cloning the data itself (cheap clones). The
///     workspace hands out such handles from `fetch_blob`.
/// 2.  **Interior Mutability:** Metadata within `TensorData` can be modified
///     through an immutable `Tensor` reference, using the `RwLock`.
pub struct Tensor {
    /// Arc for shared ownership, RwLock for interior mutability of TensorData.
    pub(crate) data: Arc<RwLock<TensorData>>,
}

impl Tensor {
    /// Creates a new Tensor with the given f32 data and shape on the CPU.
    ///
    /// This is the primary constructor for creating tensors from raw data.
    /// It calculates contiguous strides automatically.
    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, GradNetError> {
        let tensor_data = TensorData::new(data_vec, shape)?;
        Ok(Tensor {
            data: Arc::new(RwLock::new(tensor_data)),
        })
    }

    /// Creates a new Tensor with the given f64 data and shape on the CPU.
    pub fn new_f64(data_vec: Vec<f64>, shape: Vec<usize>) -> Result<Self, GradNetError> {
        let tensor_data = TensorData::new_f64(data_vec, shape)?;
        Ok(Tensor {
            data: Arc::new(RwLock::new(tensor_data)),
        })
    }

    pub(crate) fn from_data(tensor_data: TensorData) -> Self {
        Tensor {
            data: Arc::new(RwLock::new(tensor_data)),
        }
    }

    /// Returns the data type (`DType`) of the tensor elements.
    pub fn dtype(&self) -> DType {
        self.read_data().dtype
    }

    /// Returns the device (`DeviceType`) where the tensor's data resides.
    pub fn device(&self) -> DeviceType {
        self.read_data().device
    }

    /// Returns a clone of the tensor's shape (`Vec<usize>`).
    pub fn shape(&self) -> Vec<usize> {
        self.read_data().shape.clone()
    }

    /// Returns a clone of the tensor's strides (`Vec<usize>`).
    pub fn strides(&self) -> Vec<usize> {
        self.read_data().strides.clone()
    }

    /// Checks if the tensor is contiguous in memory.
    pub fn is_contiguous(&self) -> bool {
        self.read_data().is_contiguous()
    }

    /// Returns the number of elements in the tensor.
    pub fn numel(&self) -> usize {
        self.read_data().numel()
    }

    /// Acquires a read lock on the tensor's data.
    ///
    /// The lock is automatically released when the guard goes out of scope.
    /// Panics if the RwLock is poisoned.
    pub fn read_data(&self) -> std::sync::RwLockReadGuard<'_, TensorData> {
        self.data.read().expect("RwLock poisoned")
    }

    /// Copies the tensor's f32 data out as a flat `Vec<f32>` in logical
    /// (row-major) order.
    ///
    /// Requires a contiguous CPU F32 tensor; views produced by the reshape
    /// operators stay contiguous so this covers every blob the runtime makes.
    pub fn get_f32_data(&self) -> Result<Vec<f32>, GradNetError> {
        let guard = self.read_data();
        if !guard.is_contiguous() {
            return Err(GradNetError::UnsupportedOperation(
                "get_f32_data requires a contiguous tensor".to_string(),
            ));
        }
        let data_arc = guard.buffer().try_get_cpu_f32()?;
        let numel = guard.numel();
        Ok(data_arc[guard.offset..guard.offset + numel].to_vec())
    }

    /// Copies the tensor's f64 data out as a flat `Vec<f64>` in logical
    /// (row-major) order. Same contiguity requirement as `get_f32_data`.
    pub fn get_f64_data(&self) -> Result<Vec<f64>, GradNetError> {
        let guard = self.read_data();
        if !guard.is_contiguous() {
            return Err(GradNetError::UnsupportedOperation(
                "get_f64_data requires a contiguous tensor".to_string(),
            ));
        }
        let data_arc = guard.buffer().try_get_cpu_f64()?;
        let numel = guard.numel();
        Ok(data_arc[guard.offset..guard.offset + numel].to_vec())
    }

    /// Creates a reshaped view of this tensor sharing the same buffer.
    ///
    /// No data copy: only shape/strides metadata change. The element count
    /// must be preserved and the source must be contiguous.
    pub fn reshape_view(&self, new_shape: Vec<usize>) -> Result<Tensor, GradNetError> {
        let guard = self.read_data();

        let original_numel = guard.numel();
        let new_numel: usize = new_shape.iter().product();
        if original_numel != new_numel {
            return Err(GradNetError::ShapeMismatch {
                expected: guard.shape.clone(),
                actual: new_shape,
                operation: "reshape_view (numel mismatch)".to_string(),
            });
        }

        if !guard.is_contiguous() {
            return Err(GradNetError::UnsupportedOperation(
                "reshape_view on a non-contiguous tensor".to_string(),
            ));
        }

        let new_strides = crate::tensor::utils::calculate_strides(&new_shape);
        let view_td = TensorData::new_view(
            Arc::clone(guard.buffer()),
            guard.device,
            guard.offset,
            new_shape,
            new_strides,
        )?;
        Ok(Tensor::from_data(view_td))
    }

    /// True when both handles point to the same underlying `TensorData`.
    pub fn shares_data_with(&self, other: &Tensor) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// True when both tensors share the same underlying buffer allocation
    /// (e.g. a tensor and a reshape view of it).
    pub fn shares_buffer_with(&self, other: &Tensor) -> bool {
        Arc::ptr_eq(self.read_data().buffer(), other.read_data().buffer())
    }
}

impl Clone for Tensor {
    /// Cheap clone: copies the Arc, not the data.
    fn clone(&self) -> Self {
        Tensor {
            data: Arc::clone(&self.data),
        }
    }
}

impl std::fmt::Debug for Tensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = self.read_data();
        f.debug_struct("Tensor")
            .field("shape", &guard.shape)
            .field("dtype", &guard.dtype)
            .field("device", &guard.device)
            .finish()
    }
}
