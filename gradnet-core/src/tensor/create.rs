// src/tensor/create.rs

use crate::error::GradNetError;
use crate::tensor::Tensor;
use crate::types::DType;

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Creates a new tensor filled with zeros with the specified shape.
/// Currently creates an f32 tensor on the CPU.
pub fn zeros(shape: &[usize]) -> Result<Tensor, GradNetError> {
    let numel = shape.iter().product();
    Tensor::new(vec![0.0f32; numel], shape.to_vec())
}

/// Creates a new F64 tensor filled with zeros with the specified shape on the CPU.
pub fn zeros_f64(shape: &[usize]) -> Result<Tensor, GradNetError> {
    let numel = shape.iter().product();
    Tensor::new_f64(vec![0.0f64; numel], shape.to_vec())
}

/// Creates a new tensor filled with ones with the specified shape.
/// Currently creates an f32 tensor on the CPU.
pub fn ones(shape: &[usize]) -> Result<Tensor, GradNetError> {
    let numel = shape.iter().product();
    Tensor::new(vec![1.0f32; numel], shape.to_vec())
}

/// Creates a new tensor filled with a specific value with the specified shape.
pub fn full(shape: &[usize], value: f32) -> Result<Tensor, GradNetError> {
    let numel = shape.iter().product();
    Tensor::new(vec![value; numel], shape.to_vec())
}

/// Creates a new F64 tensor filled with a specific value.
pub fn full_f64(shape: &[usize], value: f64) -> Result<Tensor, GradNetError> {
    let numel = shape.iter().product();
    Tensor::new_f64(vec![value; numel], shape.to_vec())
}

/// Creates a new CPU F32 Tensor from a Vec<f32> and shape.
pub fn from_vec_f32(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Tensor, GradNetError> {
    Tensor::new(data_vec, shape)
}

/// Creates a new CPU F64 Tensor from a Vec<f64> and shape.
pub fn from_vec_f64(data_vec: Vec<f64>, shape: Vec<usize>) -> Result<Tensor, GradNetError> {
    Tensor::new_f64(data_vec, shape)
}

/// Creates a new tensor filled with zeros, having the same shape and DType
/// as the input tensor.
pub fn zeros_like(tensor: &Tensor) -> Result<Tensor, GradNetError> {
    let shape = tensor.shape();
    match tensor.dtype() {
        DType::F32 => zeros(&shape),
        DType::F64 => zeros_f64(&shape),
    }
}

// Note: rand and randn should take a device argument once GPU buffers exist
// and use device-specific RNGs there.

/// Creates an f32 tensor with elements sampled uniformly from [0, 1).
pub fn rand(shape: &[usize]) -> Result<Tensor, GradNetError> {
    let numel = shape.iter().product();
    let mut rng = rand::thread_rng();
    let data_vec: Vec<f32> = (0..numel).map(|_| rng.gen::<f32>()).collect();
    Tensor::new(data_vec, shape.to_vec())
}

/// Creates an f32 tensor with elements sampled from the standard normal
/// distribution.
pub fn randn(shape: &[usize]) -> Result<Tensor, GradNetError> {
    let numel = shape.iter().product();
    let mut rng = rand::thread_rng();
    let data_vec: Vec<f32> = (0..numel)
        .map(|_| StandardNormal.sample(&mut rng))
        .collect();
    Tensor::new(data_vec, shape.to_vec())
}
