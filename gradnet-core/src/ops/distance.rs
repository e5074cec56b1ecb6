// src/ops/distance.rs
//
// Row-wise dot product and its gradient. For inputs of shape (N, rest…) the
// rows are the N slices of size D = numel / N; rank-0 inputs are treated as
// a single row.

use num_traits::Float;

use crate::error::GradNetError;
use crate::net::OperatorDef;
use crate::ops::single_output;
use crate::tensor::Tensor;
use crate::types::DType;
use crate::workspace::Workspace;

/// Splits a shape into (rows, row length). A rank-0 tensor is one row of
/// one element.
fn row_layout(shape: &[usize]) -> (usize, usize) {
    if shape.is_empty() {
        return (1, 1);
    }
    let n = shape[0];
    let d: usize = shape[1..].iter().product();
    (n, d)
}

fn check_same_shape(op: &OperatorDef, x: &Tensor, y: &Tensor) -> Result<(), GradNetError> {
    if x.shape() != y.shape() {
        return Err(GradNetError::ShapeMismatch {
            expected: x.shape(),
            actual: y.shape(),
            operation: op.op_type.clone(),
        });
    }
    if x.dtype() != y.dtype() {
        return Err(GradNetError::DTypeMismatch {
            operation: op.op_type.clone(),
        });
    }
    Ok(())
}

fn dot_product_kernel<T: Float>(n: usize, d: usize, x: &[T], y: &[T]) -> Vec<T> {
    (0..n)
        .map(|i| {
            let offset = i * d;
            (0..d).fold(T::zero(), |acc, j| acc + x[offset + j] * y[offset + j])
        })
        .collect()
}

fn dot_product_gradient_kernel<T: Float>(
    n: usize,
    d: usize,
    x: &[T],
    y: &[T],
    dz: &[T],
) -> (Vec<T>, Vec<T>) {
    let mut dx = Vec::with_capacity(n * d);
    let mut dy = Vec::with_capacity(n * d);
    for i in 0..n {
        let offset = i * d;
        for j in 0..d {
            dx.push(dz[i] * y[offset + j]);
            dy.push(dz[i] * x[offset + j]);
        }
    }
    (dx, dy)
}

/// `DotProduct`: `Z[i] = Σ_j X[i, j…] · Y[i, j…]` for same-shaped `X` and
/// `Y`, producing `Z` of shape `(N)`.
pub fn dot_product_op(op: &OperatorDef, ws: &mut Workspace) -> Result<(), GradNetError> {
    op.check_input_count(2)?;
    let output = single_output(op)?;
    let x = ws.fetch_blob(&op.inputs[0])?;
    let y = ws.fetch_blob(&op.inputs[1])?;
    check_same_shape(op, &x, &y)?;

    let (n, d) = row_layout(&x.shape());
    let result = match x.dtype() {
        DType::F32 => {
            let z = dot_product_kernel(n, d, &x.get_f32_data()?, &y.get_f32_data()?);
            Tensor::new(z, vec![n])?
        }
        DType::F64 => {
            let z = dot_product_kernel(n, d, &x.get_f64_data()?, &y.get_f64_data()?);
            Tensor::new_f64(z, vec![n])?
        }
    };

    ws.feed_blob(output, result);
    Ok(())
}

/// `DotProductGradient`: inputs `(X, Y, dZ)`, outputs `(dX, dY)` with
/// `dX[i, j…] = dZ[i] · Y[i, j…]` and `dY[i, j…] = dZ[i] · X[i, j…]`.
pub fn dot_product_gradient_op(op: &OperatorDef, ws: &mut Workspace) -> Result<(), GradNetError> {
    op.check_input_count(3)?;
    if op.outputs.len() != 2 {
        return Err(GradNetError::InternalError(format!(
            "DotProductGradient expected 2 outputs, got {}",
            op.outputs.len()
        )));
    }
    let x = ws.fetch_blob(&op.inputs[0])?;
    let y = ws.fetch_blob(&op.inputs[1])?;
    let dz = ws.fetch_blob(&op.inputs[2])?;
    check_same_shape(op, &x, &y)?;

    let (n, d) = row_layout(&x.shape());
    if dz.shape() != vec![n] {
        return Err(GradNetError::ShapeMismatch {
            expected: vec![n],
            actual: dz.shape(),
            operation: op.op_type.clone(),
        });
    }
    if dz.dtype() != x.dtype() {
        return Err(GradNetError::DTypeMismatch {
            operation: op.op_type.clone(),
        });
    }

    let shape = x.shape();
    let (dx, dy) = match x.dtype() {
        DType::F32 => {
            let (dx, dy) = dot_product_gradient_kernel(
                n,
                d,
                &x.get_f32_data()?,
                &y.get_f32_data()?,
                &dz.get_f32_data()?,
            );
            (
                Tensor::new(dx, shape.clone())?,
                Tensor::new(dy, shape.clone())?,
            )
        }
        DType::F64 => {
            let (dx, dy) = dot_product_gradient_kernel(
                n,
                d,
                &x.get_f64_data()?,
                &y.get_f64_data()?,
                &dz.get_f64_data()?,
            );
            (
                Tensor::new_f64(dx, shape.clone())?,
                Tensor::new_f64(dy, shape.clone())?,
            )
        }
    };

    ws.feed_blob(&op.outputs[0], dx);
    ws.feed_blob(&op.outputs[1], dy);
    Ok(())
}
