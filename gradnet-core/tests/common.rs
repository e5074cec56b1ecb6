use gradnet_core::tensor::create;

/// Flattened uniform-random values for a tensor of the given shape, the way
/// a test feeds `GivenTensorFill`.
pub fn random_values(shape: &[usize]) -> Vec<f32> {
    create::rand(shape)
        .expect("random tensor creation failed")
        .get_f32_data()
        .expect("random tensor should be contiguous f32")
}
