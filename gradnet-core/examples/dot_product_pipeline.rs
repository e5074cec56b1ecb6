// Builds the PrependDim + DotProduct pipeline, generates its gradient
// operators and prints the resulting blob shapes.

use gradnet_core::tensor::create;
use gradnet_core::{GradNetError, NetDef, Workspace};

fn main() -> Result<(), GradNetError> {
    let old_shape = [128, 2, 4];
    let new_shape = [8, 16, 2, 4];
    let x = create::rand(&old_shape)?.get_f32_data()?;
    let y = create::rand(&new_shape)?.get_f32_data()?;

    let mut net = NetDef::new("prepend_dim_pipeline");
    net.given_tensor_fill("X", &old_shape, x);
    net.given_tensor_fill("Y", &new_shape, y);
    net.prepend_dim("X", "X_out", 8);
    net.dot_product("X_out", "Y", "Z");
    net.add_gradient_operators(&["Z"])?;

    println!("net '{}' has {} ops:", net.name, net.ops.len());
    for op in &net.ops {
        println!("  {} {:?} -> {:?}", op.op_type, op.inputs, op.outputs);
    }

    let mut ws = Workspace::new();
    ws.run_net_once(&net)?;

    for name in ["X_out", "Z", "X_grad", "Y_grad"] {
        let blob = ws.fetch_blob(name)?;
        println!("{name}: shape {:?}", blob.shape());
    }
    Ok(())
}
