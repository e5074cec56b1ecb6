// src/ops/mod.rs
//
// CPU kernels for the registered operators, dispatched by name through the
// OperatorRegistry. Each kernel reads its input blobs from the workspace and
// writes its output blobs back into it.

use std::collections::HashMap;

use crate::error::GradNetError;
use crate::net::OperatorDef;
use crate::workspace::Workspace;

pub mod distance;
pub mod fill;
pub mod reshape;
pub mod sum;

/// A kernel executes one operator record against a workspace.
pub type OpKernel = fn(&OperatorDef, &mut Workspace) -> Result<(), GradNetError>;

/// Maps operator-type names to their kernels.
///
/// The default registry carries every built-in operator; tests can register
/// extra kernels on top.
pub struct OperatorRegistry {
    kernels: HashMap<&'static str, OpKernel>,
}

impl OperatorRegistry {
    /// An empty registry, no operators known.
    pub fn empty() -> Self {
        OperatorRegistry {
            kernels: HashMap::new(),
        }
    }

    /// A registry with every built-in operator registered.
    pub fn with_builtin_ops() -> Self {
        let mut registry = OperatorRegistry::empty();
        registry.register("GivenTensorFill", fill::given_tensor_fill_op);
        registry.register("ConstantFill", fill::constant_fill_op);
        registry.register("PrependDim", reshape::prepend_dim_op);
        registry.register("MergeDim", reshape::merge_dim_op);
        registry.register("ResizeLike", reshape::resize_like_op);
        registry.register("DotProduct", distance::dot_product_op);
        registry.register("DotProductGradient", distance::dot_product_gradient_op);
        registry.register("Sum", sum::sum_op);
        registry
    }

    /// Registers (or replaces) a kernel under `name`.
    pub fn register(&mut self, name: &'static str, kernel: OpKernel) {
        self.kernels.insert(name, kernel);
    }

    /// Looks up the kernel for an operator-type name.
    pub fn kernel_for(&self, op_type: &str) -> Result<OpKernel, GradNetError> {
        self.kernels
            .get(op_type)
            .copied()
            .ok_or_else(|| GradNetError::UnknownOperator {
                op_type: op_type.to_string(),
            })
    }

    /// True when a kernel is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.kernels.contains_key(name)
    }
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        OperatorRegistry::with_builtin_ops()
    }
}

/// Returns the single output name of an operator record, erroring when the
/// record does not have exactly one output.
pub(crate) fn single_output(op: &OperatorDef) -> Result<&str, GradNetError> {
    match op.outputs.as_slice() {
        [name] => Ok(name),
        _ => Err(GradNetError::InternalError(format!(
            "operator '{}' expected exactly one output, got {}",
            op.op_type,
            op.outputs.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_contents() {
        let registry = OperatorRegistry::default();
        for name in [
            "GivenTensorFill",
            "ConstantFill",
            "PrependDim",
            "MergeDim",
            "ResizeLike",
            "DotProduct",
            "DotProductGradient",
            "Sum",
        ] {
            assert!(registry.contains(name), "missing builtin op {name}");
        }
    }

    #[test]
    fn test_unknown_operator_lookup() {
        let registry = OperatorRegistry::default();
        assert!(matches!(
            registry.kernel_for("Conv2D"),
            Err(GradNetError::UnknownOperator { .. })
        ));
    }
}
