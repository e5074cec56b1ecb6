// src/workspace.rs

use std::collections::HashMap;

use log::{debug, trace};

use crate::device::num_gpu_devices;
use crate::error::GradNetError;
use crate::net::{NetDef, OperatorDef};
use crate::ops::OperatorRegistry;
use crate::tensor::Tensor;

/// Named tensor store and net runner.
///
/// Blobs are tensors addressed by name. Kernels read their inputs from the
/// workspace and write their outputs back; fetching a blob hands out a cheap
/// shared handle, not a copy.
pub struct Workspace {
    blobs: HashMap<String, Tensor>,
    registry: OperatorRegistry,
}

impl Workspace {
    /// A fresh workspace with the built-in operator registry.
    pub fn new() -> Self {
        Workspace {
            blobs: HashMap::new(),
            registry: OperatorRegistry::with_builtin_ops(),
        }
    }

    /// A fresh workspace with a caller-provided registry.
    pub fn with_registry(registry: OperatorRegistry) -> Self {
        Workspace {
            blobs: HashMap::new(),
            registry,
        }
    }

    /// Stores `tensor` under `name`, replacing any previous blob.
    pub fn feed_blob(&mut self, name: impl Into<String>, tensor: Tensor) {
        let name = name.into();
        trace!("feed blob '{}' shape {:?}", name, tensor.shape());
        self.blobs.insert(name, tensor);
    }

    /// Fetches a shared handle to the blob named `name`.
    pub fn fetch_blob(&self, name: &str) -> Result<Tensor, GradNetError> {
        self.blobs
            .get(name)
            .cloned()
            .ok_or_else(|| GradNetError::BlobNotFound {
                name: name.to_string(),
            })
    }

    /// True when a blob named `name` exists.
    pub fn has_blob(&self, name: &str) -> bool {
        self.blobs.contains_key(name)
    }

    /// Names of all blobs, sorted for deterministic iteration.
    pub fn blob_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.blobs.keys().cloned().collect();
        names.sort();
        names
    }

    /// Removes the blob named `name`, returning it if present.
    pub fn remove_blob(&mut self, name: &str) -> Option<Tensor> {
        self.blobs.remove(name)
    }

    /// Executes a single operator record against this workspace.
    pub fn run_op_once(&mut self, op: &OperatorDef) -> Result<(), GradNetError> {
        if op.device.is_gpu() && num_gpu_devices() == 0 {
            return Err(GradNetError::UnsupportedDevice {
                device: op.device,
                op_type: op.op_type.clone(),
            });
        }
        trace!(
            "running op '{}' inputs {:?} outputs {:?}",
            op.op_type,
            op.inputs,
            op.outputs
        );
        let kernel = self.registry.kernel_for(&op.op_type)?;
        kernel(op, self)
    }

    /// Executes every operator of `net` once, in order.
    pub fn run_net_once(&mut self, net: &NetDef) -> Result<(), GradNetError> {
        debug!("running net '{}' ({} ops)", net.name, net.ops.len());
        for op in &net.ops {
            self.run_op_once(op)?;
        }
        Ok(())
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Workspace::new()
    }
}
