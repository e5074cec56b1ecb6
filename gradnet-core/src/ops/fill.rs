// src/ops/fill.rs
//
// Fill operators materialize tensors into the workspace without reading any
// tensor inputs (ConstantFill may read one input for its shape). They have
// no gradients.

use crate::error::GradNetError;
use crate::net::OperatorDef;
use crate::ops::single_output;
use crate::tensor::{create, Tensor};
use crate::types::DType;
use crate::workspace::Workspace;

/// `GivenTensorFill`: creates an f32 tensor from the literal `values`
/// argument with the `shape` argument.
pub fn given_tensor_fill_op(op: &OperatorDef, ws: &mut Workspace) -> Result<(), GradNetError> {
    op.check_input_count(0)?;
    let output = single_output(op)?;

    let shape: Vec<usize> = op.ints_arg("shape")?.iter().map(|&d| d as usize).collect();
    let values = op.floats_arg("values")?;

    let numel: usize = shape.iter().product();
    if values.len() != numel {
        return Err(GradNetError::InvalidArgument {
            op_type: op.op_type.clone(),
            arg: "values".to_string(),
            message: format!("got {} values for shape {:?}", values.len(), shape),
        });
    }

    let tensor = Tensor::new(values.to_vec(), shape)?;
    ws.feed_blob(output, tensor);
    Ok(())
}

/// `ConstantFill`: creates a tensor filled with the `value` argument
/// (default 0.0). With one input the output takes that input's shape and
/// dtype; with no inputs the `shape` argument is used and the dtype is f32.
///
/// The gradient generator seeds output gradients with
/// `ConstantFill(value=1.0)`.
pub fn constant_fill_op(op: &OperatorDef, ws: &mut Workspace) -> Result<(), GradNetError> {
    let output = single_output(op)?;
    let value = op.float_arg_or("value", 0.0)?;

    let tensor = match op.inputs.as_slice() {
        [] => {
            let shape: Vec<usize> = op.ints_arg("shape")?.iter().map(|&d| d as usize).collect();
            create::full(&shape, value)?
        }
        [input] => {
            let reference = ws.fetch_blob(input)?;
            let shape = reference.shape();
            match reference.dtype() {
                DType::F32 => create::full(&shape, value)?,
                DType::F64 => create::full_f64(&shape, value as f64)?,
            }
        }
        other => {
            return Err(GradNetError::InputCountMismatch {
                op_type: op.op_type.clone(),
                expected: 1,
                actual: other.len(),
            });
        }
    };

    ws.feed_blob(output, tensor);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_given_tensor_fill() {
        let mut ws = Workspace::new();
        let op = OperatorDef::new("GivenTensorFill")
            .output("X")
            .arg_ints("shape", vec![2, 3])
            .arg_floats("values", (0..6).map(|v| v as f32).collect());
        given_tensor_fill_op(&op, &mut ws).unwrap();

        let x = ws.fetch_blob("X").unwrap();
        assert_eq!(x.shape(), vec![2, 3]);
        assert_relative_eq!(x.get_f32_data().unwrap()[4], 4.0);
    }

    #[test]
    fn test_given_tensor_fill_value_count_mismatch() {
        let mut ws = Workspace::new();
        let op = OperatorDef::new("GivenTensorFill")
            .output("X")
            .arg_ints("shape", vec![2, 3])
            .arg_floats("values", vec![1.0; 5]);
        assert!(matches!(
            given_tensor_fill_op(&op, &mut ws),
            Err(GradNetError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_constant_fill_from_shape_arg() {
        let mut ws = Workspace::new();
        let op = OperatorDef::new("ConstantFill")
            .output("C")
            .arg_ints("shape", vec![4])
            .arg_float("value", 2.5);
        constant_fill_op(&op, &mut ws).unwrap();

        let c = ws.fetch_blob("C").unwrap();
        assert_eq!(c.get_f32_data().unwrap(), vec![2.5; 4]);
    }

    #[test]
    fn test_constant_fill_like_input() {
        let mut ws = Workspace::new();
        ws.feed_blob("Z", Tensor::new(vec![3.0, 4.0], vec![2]).unwrap());
        let op = OperatorDef::new("ConstantFill")
            .input("Z")
            .output("Z_grad")
            .arg_float("value", 1.0);
        constant_fill_op(&op, &mut ws).unwrap();

        let g = ws.fetch_blob("Z_grad").unwrap();
        assert_eq!(g.shape(), vec![2]);
        assert_eq!(g.get_f32_data().unwrap(), vec![1.0, 1.0]);
    }
}
