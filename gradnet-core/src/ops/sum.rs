// src/ops/sum.rs

use num_traits::Float;

use crate::error::GradNetError;
use crate::net::OperatorDef;
use crate::ops::single_output;
use crate::tensor::Tensor;
use crate::types::DType;
use crate::workspace::Workspace;

fn sum_kernel<T: Float>(buffers: &[Vec<T>]) -> Vec<T> {
    let mut acc = buffers[0].clone();
    for buffer in &buffers[1..] {
        for (a, b) in acc.iter_mut().zip(buffer) {
            *a = *a + *b;
        }
    }
    acc
}

/// `Sum`: elementwise sum of one or more same-shaped inputs. The gradient
/// generator emits it to fold autosplit gradient contributions together.
pub fn sum_op(op: &OperatorDef, ws: &mut Workspace) -> Result<(), GradNetError> {
    if op.inputs.is_empty() {
        return Err(GradNetError::InputCountMismatch {
            op_type: op.op_type.clone(),
            expected: 1,
            actual: 0,
        });
    }
    let output = single_output(op)?;

    let tensors: Vec<Tensor> = op
        .inputs
        .iter()
        .map(|name| ws.fetch_blob(name))
        .collect::<Result<_, _>>()?;

    let shape = tensors[0].shape();
    let dtype = tensors[0].dtype();
    for t in &tensors[1..] {
        if t.shape() != shape {
            return Err(GradNetError::ShapeMismatch {
                expected: shape.clone(),
                actual: t.shape(),
                operation: op.op_type.clone(),
            });
        }
        if t.dtype() != dtype {
            return Err(GradNetError::DTypeMismatch {
                operation: op.op_type.clone(),
            });
        }
    }

    let result = match dtype {
        DType::F32 => {
            let buffers: Vec<Vec<f32>> = tensors
                .iter()
                .map(|t| t.get_f32_data())
                .collect::<Result<_, _>>()?;
            Tensor::new(sum_kernel(&buffers), shape)?
        }
        DType::F64 => {
            let buffers: Vec<Vec<f64>> = tensors
                .iter()
                .map(|t| t.get_f64_data())
                .collect::<Result<_, _>>()?;
            Tensor::new_f64(sum_kernel(&buffers), shape)?
        }
    };

    ws.feed_blob(output, result);
    Ok(())
}
