// End-to-end execution of generated gradient nets beyond the PrependDim
// case: the MergeDim/ResizeLike path and gradient accumulation through Sum.

use gradnet_core::{NetDef, Workspace};

use approx::assert_relative_eq;

mod common;
use common::random_values;

#[test]
fn test_merge_dim_fwd_bwd() {
    let old_shape = [4, 3, 2];
    let merged_shape = [12, 2];
    let x = random_values(&old_shape);
    let y = random_values(&merged_shape);

    let mut net = NetDef::new("net");
    net.given_tensor_fill("X", &old_shape, x);
    net.given_tensor_fill("Y", &merged_shape, y);
    net.merge_dim("X", "X_out");
    net.dot_product("X_out", "Y", "Z");
    net.add_gradient_operators(&["Z"]).unwrap();

    let mut ws = Workspace::new();
    ws.run_net_once(&net).unwrap();

    assert_eq!(ws.fetch_blob("X_out").unwrap().shape(), merged_shape.to_vec());
    // ResizeLike folds the gradient back to the unmerged shape.
    assert_eq!(ws.fetch_blob("X_grad").unwrap().shape(), old_shape.to_vec());
    assert_eq!(ws.fetch_blob("Y_grad").unwrap().shape(), merged_shape.to_vec());
}

#[test]
fn test_self_dot_product_accumulates_gradient() {
    // DotProduct(X, X) sends two contributions into X_grad; the generated
    // Sum op must fold them, giving d/dX Σ x² = 2x.
    let shape = [2, 3];
    let x = random_values(&shape);

    let mut net = NetDef::new("net");
    net.given_tensor_fill("X", &shape, x.clone());
    net.dot_product("X", "X", "Z");
    net.add_gradient_operators(&["Z"]).unwrap();

    let mut ws = Workspace::new();
    ws.run_net_once(&net).unwrap();

    let x_grad = ws.fetch_blob("X_grad").unwrap();
    assert_eq!(x_grad.shape(), shape.to_vec());
    for (g, v) in x_grad.get_f32_data().unwrap().iter().zip(&x) {
        assert_relative_eq!(*g, 2.0 * *v, max_relative = 1e-6);
    }
}

#[test]
fn test_rerunning_net_keeps_shapes() {
    // Blobs are overwritten on re-execution, never accumulated.
    let mut net = NetDef::new("net");
    net.given_tensor_fill("X", &[6], random_values(&[6]));
    net.prepend_dim("X", "X_out", 3);

    let mut ws = Workspace::new();
    ws.run_net_once(&net).unwrap();
    ws.run_net_once(&net).unwrap();

    assert_eq!(ws.fetch_blob("X_out").unwrap().shape(), vec![3, 2]);
}
