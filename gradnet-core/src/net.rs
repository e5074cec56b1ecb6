// src/net.rs
//
// Graph description: operator records collected into a net. The net is pure
// data; execution lives in the workspace and kernels live in `ops`.

use std::collections::BTreeMap;

use crate::device::DeviceType;
use crate::error::GradNetError;

/// A keyword argument attached to an operator record.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Int(i64),
    Float(f32),
    Ints(Vec<i64>),
    Floats(Vec<f32>),
}

/// One operator invocation: type name, positional input/output blob names,
/// keyword arguments and the device it should run on.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorDef {
    pub op_type: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub args: BTreeMap<String, Arg>,
    pub device: DeviceType,
}

impl OperatorDef {
    pub fn new(op_type: impl Into<String>) -> Self {
        OperatorDef {
            op_type: op_type.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            args: BTreeMap::new(),
            device: DeviceType::default(),
        }
    }

    pub fn input(mut self, name: impl Into<String>) -> Self {
        self.inputs.push(name.into());
        self
    }

    pub fn inputs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn output(mut self, name: impl Into<String>) -> Self {
        self.outputs.push(name.into());
        self
    }

    pub fn outputs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn arg(mut self, name: impl Into<String>, value: Arg) -> Self {
        self.args.insert(name.into(), value);
        self
    }

    pub fn arg_int(self, name: impl Into<String>, value: i64) -> Self {
        self.arg(name, Arg::Int(value))
    }

    pub fn arg_float(self, name: impl Into<String>, value: f32) -> Self {
        self.arg(name, Arg::Float(value))
    }

    pub fn arg_ints(self, name: impl Into<String>, values: Vec<i64>) -> Self {
        self.arg(name, Arg::Ints(values))
    }

    pub fn arg_floats(self, name: impl Into<String>, values: Vec<f32>) -> Self {
        self.arg(name, Arg::Floats(values))
    }

    pub fn on_device(mut self, device: DeviceType) -> Self {
        self.device = device;
        self
    }

    // --- Checked argument accessors, used by kernels ---

    /// Fetches a required integer argument.
    pub fn int_arg(&self, name: &str) -> Result<i64, GradNetError> {
        match self.args.get(name) {
            Some(Arg::Int(v)) => Ok(*v),
            Some(_) => Err(self.invalid_arg(name, "expected an integer")),
            None => Err(GradNetError::MissingArgument {
                op_type: self.op_type.clone(),
                arg: name.to_string(),
            }),
        }
    }

    /// Fetches a required integer-list argument.
    pub fn ints_arg(&self, name: &str) -> Result<&[i64], GradNetError> {
        match self.args.get(name) {
            Some(Arg::Ints(v)) => Ok(v),
            Some(_) => Err(self.invalid_arg(name, "expected an integer list")),
            None => Err(GradNetError::MissingArgument {
                op_type: self.op_type.clone(),
                arg: name.to_string(),
            }),
        }
    }

    /// Fetches a required float-list argument.
    pub fn floats_arg(&self, name: &str) -> Result<&[f32], GradNetError> {
        match self.args.get(name) {
            Some(Arg::Floats(v)) => Ok(v),
            Some(_) => Err(self.invalid_arg(name, "expected a float list")),
            None => Err(GradNetError::MissingArgument {
                op_type: self.op_type.clone(),
                arg: name.to_string(),
            }),
        }
    }

    /// Fetches an optional float argument, falling back to `default`.
    pub fn float_arg_or(&self, name: &str, default: f32) -> Result<f32, GradNetError> {
        match self.args.get(name) {
            Some(Arg::Float(v)) => Ok(*v),
            Some(Arg::Int(v)) => Ok(*v as f32),
            Some(_) => Err(self.invalid_arg(name, "expected a float")),
            None => Ok(default),
        }
    }

    /// Validates the input count of this record against an expected count.
    pub fn check_input_count(&self, expected: usize) -> Result<(), GradNetError> {
        if self.inputs.len() != expected {
            return Err(GradNetError::InputCountMismatch {
                op_type: self.op_type.clone(),
                expected,
                actual: self.inputs.len(),
            });
        }
        Ok(())
    }

    fn invalid_arg(&self, name: &str, message: &str) -> GradNetError {
        GradNetError::InvalidArgument {
            op_type: self.op_type.clone(),
            arg: name.to_string(),
            message: message.to_string(),
        }
    }
}

/// A named sequence of operator records, executed in order by the workspace.
#[derive(Debug, Clone, Default)]
pub struct NetDef {
    pub name: String,
    pub device: DeviceType,
    pub ops: Vec<OperatorDef>,
}

impl NetDef {
    /// Creates an empty net targeting the default (CPU) device.
    pub fn new(name: impl Into<String>) -> Self {
        NetDef {
            name: name.into(),
            device: DeviceType::default(),
            ops: Vec::new(),
        }
    }

    /// Creates an empty net under a device scope: every operator added
    /// through this net is stamped with `device`.
    pub fn with_device(name: impl Into<String>, device: DeviceType) -> Self {
        NetDef {
            name: name.into(),
            device,
            ops: Vec::new(),
        }
    }

    /// Appends an operator record, stamping it with the net's device.
    pub fn add_op(&mut self, op: OperatorDef) -> &mut Self {
        self.ops.push(op.on_device(self.device));
        self
    }

    // --- Convenience builders for the registered operators ---

    /// `GivenTensorFill`: materialize a constant tensor from literal values.
    pub fn given_tensor_fill(
        &mut self,
        output: impl Into<String>,
        shape: &[usize],
        values: Vec<f32>,
    ) -> &mut Self {
        self.add_op(
            OperatorDef::new("GivenTensorFill")
                .output(output)
                .arg_ints("shape", shape.iter().map(|&d| d as i64).collect())
                .arg_floats("values", values),
        )
    }

    /// `PrependDim`: split the outermost dimension, making `dim_size` the
    /// new leading dimension.
    pub fn prepend_dim(
        &mut self,
        input: impl Into<String>,
        output: impl Into<String>,
        dim_size: usize,
    ) -> &mut Self {
        self.add_op(
            OperatorDef::new("PrependDim")
                .input(input)
                .output(output)
                .arg_int("dim_size", dim_size as i64),
        )
    }

    /// `MergeDim`: fold the two outermost dimensions into one.
    pub fn merge_dim(&mut self, input: impl Into<String>, output: impl Into<String>) -> &mut Self {
        self.add_op(OperatorDef::new("MergeDim").input(input).output(output))
    }

    /// `DotProduct`: row-wise dot product of two same-shaped tensors.
    pub fn dot_product(
        &mut self,
        x: impl Into<String>,
        y: impl Into<String>,
        output: impl Into<String>,
    ) -> &mut Self {
        self.add_op(
            OperatorDef::new("DotProduct")
                .input(x)
                .input(y)
                .output(output),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_def_builder() {
        let op = OperatorDef::new("PrependDim")
            .input("X")
            .output("X_out")
            .arg_int("dim_size", 8);
        assert_eq!(op.op_type, "PrependDim");
        assert_eq!(op.inputs, vec!["X"]);
        assert_eq!(op.outputs, vec!["X_out"]);
        assert_eq!(op.int_arg("dim_size").unwrap(), 8);
    }

    #[test]
    fn test_missing_argument() {
        let op = OperatorDef::new("PrependDim").input("X").output("X_out");
        assert!(matches!(
            op.int_arg("dim_size"),
            Err(GradNetError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_wrong_argument_kind() {
        let op = OperatorDef::new("GivenTensorFill").arg_floats("shape", vec![1.0]);
        assert!(matches!(
            op.ints_arg("shape"),
            Err(GradNetError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_float_arg_default() {
        let op = OperatorDef::new("ConstantFill");
        assert_eq!(op.float_arg_or("value", 0.0).unwrap(), 0.0);
        let op = OperatorDef::new("ConstantFill").arg_float("value", 1.0);
        assert_eq!(op.float_arg_or("value", 0.0).unwrap(), 1.0);
    }

    #[test]
    fn test_net_device_scope_stamps_ops() {
        let mut net = NetDef::with_device("net", crate::device::DeviceType::Cpu);
        net.prepend_dim("X", "X_out", 8);
        assert_eq!(net.ops.len(), 1);
        assert_eq!(net.ops[0].device, crate::device::DeviceType::Cpu);
    }

    #[test]
    fn test_net_builder_sequence() {
        let mut net = NetDef::new("net");
        net.given_tensor_fill("X", &[2, 2], vec![0.0; 4]);
        net.prepend_dim("X", "X_out", 2);
        net.dot_product("X_out", "Y", "Z");
        let types: Vec<_> = net.ops.iter().map(|o| o.op_type.as_str()).collect();
        assert_eq!(types, vec!["GivenTensorFill", "PrependDim", "DotProduct"]);
    }
}
