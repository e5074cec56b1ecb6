// Declares the main modules of the crate.
pub mod buffer;
pub mod device;
pub mod error;
pub mod gradient;
pub mod net;
pub mod ops;
pub mod tensor;
pub mod tensor_data;
pub mod types;
pub mod workspace;

// Re-export the types most callers need at the crate root.
pub use error::GradNetError;
pub use net::{Arg, NetDef, OperatorDef};
pub use tensor::Tensor;
pub use workspace::Workspace;
// Re-export traits required by public functions/structs.
pub use num_traits;
