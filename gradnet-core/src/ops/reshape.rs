// src/ops/reshape.rs
//
// Reshape operators. All of them are metadata-only: the output tensor is a
// view sharing the input's buffer, no element is copied.

use crate::error::GradNetError;
use crate::net::OperatorDef;
use crate::ops::single_output;
use crate::workspace::Workspace;

/// `PrependDim`: reshapes `(d0, rest…)` into `(dim_size, d0 / dim_size,
/// rest…)`. The outermost dimension must divide evenly by `dim_size`.
pub fn prepend_dim_op(op: &OperatorDef, ws: &mut Workspace) -> Result<(), GradNetError> {
    op.check_input_count(1)?;
    let output = single_output(op)?;
    let input = ws.fetch_blob(&op.inputs[0])?;

    let dim_size = op.int_arg("dim_size")?;
    if dim_size <= 0 {
        return Err(GradNetError::InvalidArgument {
            op_type: op.op_type.clone(),
            arg: "dim_size".to_string(),
            message: format!("must be positive, got {dim_size}"),
        });
    }
    let dim_size = dim_size as usize;

    let old_shape = input.shape();
    if old_shape.is_empty() {
        return Err(GradNetError::UnsupportedOperation(
            "PrependDim requires a tensor of rank >= 1".to_string(),
        ));
    }
    if old_shape[0] % dim_size != 0 {
        return Err(GradNetError::InvalidArgument {
            op_type: op.op_type.clone(),
            arg: "dim_size".to_string(),
            message: format!(
                "dimension {} does not divide evenly by dim_size {}",
                old_shape[0], dim_size
            ),
        });
    }

    let mut new_shape = Vec::with_capacity(old_shape.len() + 1);
    new_shape.push(dim_size);
    new_shape.push(old_shape[0] / dim_size);
    new_shape.extend_from_slice(&old_shape[1..]);

    let view = input.reshape_view(new_shape)?;
    ws.feed_blob(output, view);
    Ok(())
}

/// `MergeDim`: reshapes `(d0, d1, rest…)` into `(d0 * d1, rest…)`.
/// Inverse of `PrependDim`, and its gradient operator.
pub fn merge_dim_op(op: &OperatorDef, ws: &mut Workspace) -> Result<(), GradNetError> {
    op.check_input_count(1)?;
    let output = single_output(op)?;
    let input = ws.fetch_blob(&op.inputs[0])?;

    let old_shape = input.shape();
    if old_shape.len() < 2 {
        return Err(GradNetError::UnsupportedOperation(
            "MergeDim requires a tensor of rank >= 2".to_string(),
        ));
    }

    let mut new_shape = Vec::with_capacity(old_shape.len() - 1);
    new_shape.push(old_shape[0] * old_shape[1]);
    new_shape.extend_from_slice(&old_shape[2..]);

    let view = input.reshape_view(new_shape)?;
    ws.feed_blob(output, view);
    Ok(())
}

/// `ResizeLike`: reshapes input 0 to the shape of input 1. Element counts
/// must match. Used as the gradient of `MergeDim`.
pub fn resize_like_op(op: &OperatorDef, ws: &mut Workspace) -> Result<(), GradNetError> {
    op.check_input_count(2)?;
    let output = single_output(op)?;
    let data = ws.fetch_blob(&op.inputs[0])?;
    let reference = ws.fetch_blob(&op.inputs[1])?;

    let target_shape = reference.shape();
    if data.numel() != reference.numel() {
        return Err(GradNetError::ShapeMismatch {
            expected: target_shape,
            actual: data.shape(),
            operation: "ResizeLike (numel mismatch)".to_string(),
        });
    }

    let view = data.reshape_view(target_shape)?;
    ws.feed_blob(output, view);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::Tensor;

    fn workspace_with(name: &str, shape: Vec<usize>) -> Workspace {
        let numel = shape.iter().product();
        let mut ws = Workspace::new();
        ws.feed_blob(
            name,
            Tensor::new((0..numel).map(|v| v as f32).collect(), shape).unwrap(),
        );
        ws
    }

    #[test]
    fn test_prepend_dim_shape() {
        let mut ws = workspace_with("X", vec![128, 2, 4]);
        let op = OperatorDef::new("PrependDim")
            .input("X")
            .output("X_out")
            .arg_int("dim_size", 8);
        prepend_dim_op(&op, &mut ws).unwrap();

        let out = ws.fetch_blob("X_out").unwrap();
        assert_eq!(out.shape(), vec![8, 16, 2, 4]);
    }

    #[test]
    fn test_prepend_dim_shares_buffer() {
        let mut ws = workspace_with("X", vec![6]);
        let op = OperatorDef::new("PrependDim")
            .input("X")
            .output("X_out")
            .arg_int("dim_size", 2);
        prepend_dim_op(&op, &mut ws).unwrap();

        let x = ws.fetch_blob("X").unwrap();
        let out = ws.fetch_blob("X_out").unwrap();
        assert!(x.shares_buffer_with(&out));
        assert_eq!(out.get_f32_data().unwrap(), x.get_f32_data().unwrap());
    }

    #[test]
    fn test_prepend_dim_indivisible() {
        let mut ws = workspace_with("X", vec![10, 3]);
        let op = OperatorDef::new("PrependDim")
            .input("X")
            .output("X_out")
            .arg_int("dim_size", 4);
        assert!(matches!(
            prepend_dim_op(&op, &mut ws),
            Err(GradNetError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_prepend_dim_nonpositive_dim_size() {
        let mut ws = workspace_with("X", vec![4]);
        let op = OperatorDef::new("PrependDim")
            .input("X")
            .output("X_out")
            .arg_int("dim_size", 0);
        assert!(matches!(
            prepend_dim_op(&op, &mut ws),
            Err(GradNetError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_merge_dim_inverts_prepend_dim() {
        let mut ws = workspace_with("X", vec![8, 16, 2, 4]);
        let op = OperatorDef::new("MergeDim").input("X").output("X_merged");
        merge_dim_op(&op, &mut ws).unwrap();

        let merged = ws.fetch_blob("X_merged").unwrap();
        assert_eq!(merged.shape(), vec![128, 2, 4]);
    }

    #[test]
    fn test_merge_dim_rank_too_low() {
        let mut ws = workspace_with("X", vec![8]);
        let op = OperatorDef::new("MergeDim").input("X").output("Y");
        assert!(matches!(
            merge_dim_op(&op, &mut ws),
            Err(GradNetError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_resize_like() {
        let mut ws = workspace_with("G", vec![6]);
        ws.feed_blob("X", Tensor::new(vec![0.0; 6], vec![2, 3]).unwrap());
        let op = OperatorDef::new("ResizeLike")
            .inputs(["G", "X"])
            .output("G_reshaped");
        resize_like_op(&op, &mut ws).unwrap();

        let out = ws.fetch_blob("G_reshaped").unwrap();
        assert_eq!(out.shape(), vec![2, 3]);
    }

    #[test]
    fn test_resize_like_numel_mismatch() {
        let mut ws = workspace_with("G", vec![6]);
        ws.feed_blob("X", Tensor::new(vec![0.0; 4], vec![2, 2]).unwrap());
        let op = OperatorDef::new("ResizeLike").inputs(["G", "X"]).output("O");
        assert!(matches!(
            resize_like_op(&op, &mut ws),
            Err(GradNetError::ShapeMismatch { .. })
        ));
    }
}
