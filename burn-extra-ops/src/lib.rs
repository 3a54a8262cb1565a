//! Additional operations for the Burn deep learning framework
//!
//! This crate provides operations that are commonly used in encoder/decoder
//! networks but are not yet available in the core Burn framework.

use burn::prelude::*;

mod channel_dropout;
mod crop;

// Convenient re-exports
pub use channel_dropout::{ChannelDropout, ChannelDropoutConfig};
pub use crop::{center_range, crop_center, crop_center_to, CropError};

/// Additional operations for Burn feature maps
pub trait TensorExtraOps<B: Backend>: Sized {
    /// Crop the tensor to the spatial size of `reference`, keeping the center
    fn crop_center(self, reference: &Self) -> Result<Self, CropError>;

    /// Apply channel-wise dropout to the tensor
    fn channel_dropout(self, prob: f64, training: bool) -> Self;
}

impl<B: Backend> TensorExtraOps<B> for Tensor<B, 4> {
    fn crop_center(self, reference: &Self) -> Result<Self, CropError> {
        crop_center(self, reference)
    }

    fn channel_dropout(self, prob: f64, training: bool) -> Self {
        ChannelDropoutConfig::new()
            .with_prob(prob)
            .init()
            .forward(self, training)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::{
        backend::{ndarray::NdArray, Autodiff},
        tensor::Tensor,
    };

    type TestBackend = Autodiff<NdArray<f32>>;

    #[test]
    fn test_tensor_extra_ops() {
        let device = Default::default();
        let tensor = Tensor::<TestBackend, 4>::random(
            [2, 3, 9, 9],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        let reference = Tensor::<TestBackend, 4>::zeros([2, 3, 8, 8], &device);

        // channel_dropout returns the same tensor when not training
        let result_no_drop = tensor.clone().channel_dropout(0.1, false);
        assert_eq!(result_no_drop.dims(), tensor.dims());

        let cropped = tensor.crop_center(&reference).unwrap();
        assert_eq!(cropped.dims(), [2, 3, 8, 8]);
    }

    #[test]
    fn test_crop_gradient_flows() {
        let device = Default::default();
        let tensor = Tensor::<TestBackend, 4>::ones([1, 1, 5, 5], &device).require_grad();

        let cropped = crop_center_to(tensor.clone(), [3, 3]).unwrap();
        let grads = cropped.sum().backward();
        let grad = tensor.grad(&grads).unwrap();

        // Only the 3x3 center receives gradient.
        assert_eq!(grad.sum().into_scalar(), 9.0);
    }
}
