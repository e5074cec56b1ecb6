// src/gradient.rs
//
// Gradient-operator generation. Instead of a runtime tape, differentiation
// here is a net-to-net transformation: each differentiable operator type has
// a generator that emits the operator records computing its input gradients,
// and `add_gradient_operators` stitches those records onto the net in
// reverse topological order.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use crate::error::GradNetError;
use crate::net::{NetDef, OperatorDef};

/// Canonical name of the gradient blob for `name`.
pub fn grad_blob_name(name: &str) -> String {
    format!("{name}_grad")
}

/// The records a gradient generator emits for one forward operator, plus the
/// gradient blob name (if any) for each forward input, positionally.
#[derive(Debug)]
pub struct GradientOps {
    pub ops: Vec<OperatorDef>,
    pub input_grads: Vec<Option<String>>,
}

/// Generates the gradient records for one forward operator record.
pub type GradientFn = fn(&OperatorDef) -> Result<GradientOps, GradNetError>;

/// Maps operator-type names to their gradient generators. Fill operators are
/// listed as gradient-free: they produce leaves, so the generator skips them
/// silently instead of erroring.
pub struct GradientRegistry {
    generators: HashMap<&'static str, GradientFn>,
    gradient_free: HashSet<&'static str>,
}

impl GradientRegistry {
    pub fn empty() -> Self {
        GradientRegistry {
            generators: HashMap::new(),
            gradient_free: HashSet::new(),
        }
    }

    /// A registry with generators for every differentiable built-in
    /// operator.
    pub fn with_builtin_gradients() -> Self {
        let mut registry = GradientRegistry::empty();
        registry.register("PrependDim", prepend_dim_gradient);
        registry.register("MergeDim", merge_dim_gradient);
        registry.register("DotProduct", dot_product_gradient);
        registry.mark_gradient_free("GivenTensorFill");
        registry.mark_gradient_free("ConstantFill");
        registry
    }

    pub fn register(&mut self, name: &'static str, generator: GradientFn) {
        self.generators.insert(name, generator);
    }

    /// Marks an operator type as having no inputs to differentiate.
    pub fn mark_gradient_free(&mut self, name: &'static str) {
        self.gradient_free.insert(name);
    }

    pub fn generator_for(&self, op_type: &str) -> Option<GradientFn> {
        self.generators.get(op_type).copied()
    }

    pub fn is_gradient_free(&self, op_type: &str) -> bool {
        self.gradient_free.contains(op_type)
    }
}

impl Default for GradientRegistry {
    fn default() -> Self {
        GradientRegistry::with_builtin_gradients()
    }
}

// --- Built-in gradient generators ---

/// PrependDim's gradient is MergeDim: folding the prepended dimension back
/// restores the original shape.
fn prepend_dim_gradient(op: &OperatorDef) -> Result<GradientOps, GradNetError> {
    let grad_out = grad_blob_name(&op.outputs[0]);
    let grad_in = grad_blob_name(&op.inputs[0]);
    Ok(GradientOps {
        ops: vec![OperatorDef::new("MergeDim")
            .input(grad_out)
            .output(grad_in.clone())],
        input_grads: vec![Some(grad_in)],
    })
}

/// MergeDim's gradient reshapes the output gradient back to the input's
/// shape via ResizeLike.
fn merge_dim_gradient(op: &OperatorDef) -> Result<GradientOps, GradNetError> {
    let grad_out = grad_blob_name(&op.outputs[0]);
    let grad_in = grad_blob_name(&op.inputs[0]);
    Ok(GradientOps {
        ops: vec![OperatorDef::new("ResizeLike")
            .input(grad_out)
            .input(op.inputs[0].clone())
            .output(grad_in.clone())],
        input_grads: vec![Some(grad_in)],
    })
}

fn dot_product_gradient(op: &OperatorDef) -> Result<GradientOps, GradNetError> {
    let grad_out = grad_blob_name(&op.outputs[0]);
    let grad_x = grad_blob_name(&op.inputs[0]);
    let grad_y = grad_blob_name(&op.inputs[1]);
    Ok(GradientOps {
        ops: vec![OperatorDef::new("DotProductGradient")
            .input(op.inputs[0].clone())
            .input(op.inputs[1].clone())
            .input(grad_out)
            .output(grad_x.clone())
            .output(grad_y.clone())],
        input_grads: vec![Some(grad_x), Some(grad_y)],
    })
}

// --- Generation pass ---

/// Finds the first unclaimed (op index, output index) slot producing
/// `grad_name` among freshly generated gradient ops.
fn find_producing_slot(
    ops: &[OperatorDef],
    grad_name: &str,
    claimed: &HashSet<(usize, usize)>,
) -> Option<(usize, usize)> {
    for (i, op) in ops.iter().enumerate() {
        for (j, output) in op.outputs.iter().enumerate() {
            if output == grad_name && !claimed.contains(&(i, j)) {
                return Some((i, j));
            }
        }
    }
    None
}

impl NetDef {
    /// Appends gradient operators computing d(output)/d(blob) for every blob
    /// feeding the requested outputs, using the built-in gradient registry.
    ///
    /// Mirrors the classic "add gradient operators" net transformation:
    /// each output gradient is seeded with ones, then the forward operators
    /// are walked in reverse emitting their gradient records. Gradient blobs
    /// are named `<blob>_grad`.
    pub fn add_gradient_operators(&mut self, outputs: &[&str]) -> Result<(), GradNetError> {
        add_gradient_operators_with(self, outputs, &GradientRegistry::with_builtin_gradients())
    }
}

/// Same as [`NetDef::add_gradient_operators`] with an explicit registry.
pub fn add_gradient_operators_with(
    net: &mut NetDef,
    outputs: &[&str],
    registry: &GradientRegistry,
) -> Result<(), GradNetError> {
    debug!(
        "generating gradient operators for net '{}' w.r.t. {:?}",
        net.name, outputs
    );

    // blob name -> name of the blob holding its gradient
    let mut grad_map: HashMap<String, String> = HashMap::new();
    let mut autosplit_counts: HashMap<String, usize> = HashMap::new();
    let mut generated: Vec<OperatorDef> = Vec::new();

    // Seed each requested output's gradient with ones.
    for &output in outputs {
        let grad_name = grad_blob_name(output);
        generated.push(
            OperatorDef::new("ConstantFill")
                .input(output)
                .output(grad_name.clone())
                .arg_float("value", 1.0)
                .on_device(net.device),
        );
        grad_map.insert(output.to_string(), grad_name);
    }

    for op in net.ops.iter().rev() {
        let gradient_flows = op.outputs.iter().any(|o| grad_map.contains_key(o));
        if !gradient_flows {
            trace!("skipping '{}', no gradient flows through it", op.op_type);
            continue;
        }
        let generator = match registry.generator_for(&op.op_type) {
            Some(generator) => generator,
            None if registry.is_gradient_free(&op.op_type) => continue,
            None => {
                return Err(GradNetError::NoGradientDefined {
                    op_type: op.op_type.clone(),
                })
            }
        };

        let mut gradient_ops = generator(op)?;
        for g in &mut gradient_ops.ops {
            g.device = op.device;
        }

        if gradient_ops.input_grads.len() != op.inputs.len() {
            return Err(GradNetError::InternalError(format!(
                "gradient generator for '{}' returned {} input grads for {} inputs",
                op.op_type,
                gradient_ops.input_grads.len(),
                op.inputs.len()
            )));
        }

        // Record each produced input gradient; a second contribution to the
        // same blob is renamed and folded in with a Sum op. Output slots are
        // claimed positionally so an op writing the same gradient name twice
        // (e.g. DotProduct(X, X)) renames only the duplicate slot.
        let mut claimed: HashSet<(usize, usize)> = HashSet::new();
        let mut sums: Vec<OperatorDef> = Vec::new();
        for (input, maybe_grad) in op.inputs.iter().zip(&gradient_ops.input_grads) {
            let Some(grad_name) = maybe_grad else { continue };
            let slot = find_producing_slot(&gradient_ops.ops, grad_name, &claimed);
            if let Some(existing) = grad_map.get(input).cloned() {
                let count = autosplit_counts.entry(input.clone()).or_insert(0);
                *count += 1;
                let split_name = format!("{grad_name}_autosplit_{count}");
                if let Some((i, j)) = slot {
                    gradient_ops.ops[i].outputs[j] = split_name.clone();
                    claimed.insert((i, j));
                }
                sums.push(
                    OperatorDef::new("Sum")
                        .input(existing.clone())
                        .input(split_name)
                        .output(existing)
                        .on_device(op.device),
                );
            } else {
                if let Some(slot) = slot {
                    claimed.insert(slot);
                }
                grad_map.insert(input.clone(), grad_name.clone());
            }
        }
        gradient_ops.ops.append(&mut sums);

        generated.append(&mut gradient_ops.ops);
    }

    debug!("generated {} gradient operators", generated.len());
    net.ops.append(&mut generated);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepend_dot_net() -> NetDef {
        let mut net = NetDef::new("net");
        net.given_tensor_fill("X", &[4, 2], vec![0.0; 8]);
        net.given_tensor_fill("Y", &[2, 2, 2], vec![0.0; 8]);
        net.prepend_dim("X", "X_out", 2);
        net.dot_product("X_out", "Y", "Z");
        net
    }

    #[test]
    fn test_generated_op_sequence() {
        let mut net = prepend_dot_net();
        net.add_gradient_operators(&["Z"]).unwrap();

        let types: Vec<_> = net.ops.iter().map(|o| o.op_type.as_str()).collect();
        assert_eq!(
            types,
            vec![
                "GivenTensorFill",
                "GivenTensorFill",
                "PrependDim",
                "DotProduct",
                "ConstantFill",
                "DotProductGradient",
                "MergeDim",
            ]
        );
    }

    #[test]
    fn test_gradient_blob_naming() {
        let mut net = prepend_dot_net();
        net.add_gradient_operators(&["Z"]).unwrap();

        let merge = net.ops.last().unwrap();
        assert_eq!(merge.inputs, vec!["X_out_grad"]);
        assert_eq!(merge.outputs, vec!["X_grad"]);

        let dot_grad = &net.ops[net.ops.len() - 2];
        assert_eq!(dot_grad.inputs, vec!["X_out", "Y", "Z_grad"]);
        assert_eq!(dot_grad.outputs, vec!["X_out_grad", "Y_grad"]);
    }

    #[test]
    fn test_seed_is_constant_fill_of_ones() {
        let mut net = prepend_dot_net();
        net.add_gradient_operators(&["Z"]).unwrap();

        let seed = &net.ops[4];
        assert_eq!(seed.op_type, "ConstantFill");
        assert_eq!(seed.inputs, vec!["Z"]);
        assert_eq!(seed.outputs, vec!["Z_grad"]);
        assert_eq!(seed.float_arg_or("value", 0.0).unwrap(), 1.0);
    }

    #[test]
    fn test_shared_input_gets_sum() {
        // X feeds both sides of the dot product, so X_grad receives two
        // contributions that must be folded with a Sum op.
        let mut net = NetDef::new("net");
        net.given_tensor_fill("X", &[2, 2], vec![0.0; 4]);
        net.dot_product("X", "X", "Z");
        net.add_gradient_operators(&["Z"]).unwrap();

        let sum = net
            .ops
            .iter()
            .find(|o| o.op_type == "Sum")
            .expect("expected a Sum op for the duplicated gradient");
        assert_eq!(sum.inputs, vec!["X_grad", "X_grad_autosplit_1"]);
        assert_eq!(sum.outputs, vec!["X_grad"]);
    }

    #[test]
    fn test_no_gradient_defined_error() {
        let mut net = NetDef::new("net");
        net.given_tensor_fill("A", &[2], vec![0.0; 2]);
        net.given_tensor_fill("B", &[2], vec![0.0; 2]);
        net.add_op(OperatorDef::new("Sum").inputs(["A", "B"]).output("Z"));
        let result = net.add_gradient_operators(&["Z"]);
        assert!(matches!(
            result,
            Err(GradNetError::NoGradientDefined { .. })
        ));
    }

    #[test]
    fn test_unrelated_ops_are_skipped() {
        let mut net = prepend_dot_net();
        // A dangling fill that feeds nothing on the path to Z.
        net.given_tensor_fill("W", &[2], vec![0.0; 2]);
        net.merge_dim("Y", "Y_merged");
        let before = net.ops.len();
        net.add_gradient_operators(&["Z"]).unwrap();

        // No gradient op references Y_merged.
        assert!(net.ops[before..]
            .iter()
            .all(|o| !o.inputs.iter().any(|i| i == "Y_merged_grad")));
    }
}
