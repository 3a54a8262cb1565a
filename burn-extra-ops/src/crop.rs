//! # Center Cropping
//!
//! Crops a feature map to the spatial size of a reference tensor, trimming the
//! excess symmetrically from both borders.

use burn::prelude::*;
use core::ops::Range;
use thiserror::Error;

/// Error returned when a tensor cannot be center-cropped to a target size.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CropError {
    /// The source is smaller than the target along one spatial axis.
    #[error("cannot crop {axis} of size {actual} to larger size {target}")]
    TooSmall {
        /// The spatial axis that is too small ("height" or "width").
        axis: &'static str,
        /// The source length along that axis.
        actual: usize,
        /// The requested length.
        target: usize,
    },
}

/// Returns the centered window of length `target` inside `len`.
///
/// The start offset is `(len - target) / 2`, so an odd excess leaves the extra
/// element at the trailing edge.
pub fn center_range(len: usize, target: usize) -> Option<Range<usize>> {
    let excess = len.checked_sub(target)?;
    let start = excess / 2;
    Some(start..start + target)
}

/// Crops `x` to the height and width of `reference`.
///
/// Batch and channel dimensions are kept. When the spatial sizes already match,
/// `x` is returned as is.
///
/// # Shapes
/// - x: `[batch, channels, height, width]`
/// - reference: `[_, _, target_height, target_width]`
/// - output: `[batch, channels, target_height, target_width]`
pub fn crop_center<B: Backend>(
    x: Tensor<B, 4>,
    reference: &Tensor<B, 4>,
) -> Result<Tensor<B, 4>, CropError> {
    let [_, _, target_height, target_width] = reference.dims();
    crop_center_to(x, [target_height, target_width])
}

/// Crops `x` to the given `[height, width]`, centered.
pub fn crop_center_to<B: Backend>(
    x: Tensor<B, 4>,
    [target_height, target_width]: [usize; 2],
) -> Result<Tensor<B, 4>, CropError> {
    let [batch, channels, height, width] = x.dims();
    if height == target_height && width == target_width {
        return Ok(x);
    }

    let rows = center_range(height, target_height).ok_or(CropError::TooSmall {
        axis: "height",
        actual: height,
        target: target_height,
    })?;
    let cols = center_range(width, target_width).ok_or(CropError::TooSmall {
        axis: "width",
        actual: width,
        target: target_width,
    })?;

    Ok(x.slice([0..batch, 0..channels, rows, cols]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{ndarray::NdArrayDevice, NdArray};

    type TestBackend = NdArray;

    #[test]
    fn test_center_range_even_excess() {
        assert_eq!(center_range(10, 6), Some(2..8));
    }

    #[test]
    fn test_center_range_odd_excess_trims_trailing_edge() {
        // One pixel removed, from the end.
        assert_eq!(center_range(5, 4), Some(0..4));
        assert_eq!(center_range(7, 4), Some(1..5));
    }

    #[test]
    fn test_center_range_too_small() {
        assert_eq!(center_range(3, 4), None);
    }

    #[test]
    fn test_crop_center_shape() {
        let device = NdArrayDevice::default();
        let x = Tensor::<TestBackend, 4>::ones([2, 3, 9, 12], &device);
        let reference = Tensor::<TestBackend, 4>::zeros([1, 8, 7, 11], &device);

        let cropped = crop_center(x, &reference).unwrap();
        assert_eq!(cropped.dims(), [2, 3, 7, 11]);
    }

    #[test]
    fn test_crop_center_keeps_centered_values() {
        let device = NdArrayDevice::default();
        // Row-major 1x1x4x4 grid holding 0..16.
        let x = Tensor::<TestBackend, 1, Int>::arange(0..16, &device)
            .float()
            .reshape([1, 1, 4, 4]);

        let cropped = crop_center_to(x, [2, 2]).unwrap();
        let values = cropped.into_data().to_vec::<f32>().unwrap();
        assert_eq!(values, vec![5.0, 6.0, 9.0, 10.0]);
    }

    #[test]
    fn test_crop_center_same_size_is_noop() {
        let device = NdArrayDevice::default();
        let x = Tensor::<TestBackend, 4>::random(
            [1, 2, 5, 5],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );

        let cropped = crop_center(x.clone(), &x).unwrap();
        let diff = (cropped - x).abs().sum();
        assert_eq!(diff.into_scalar(), 0.0);
    }

    #[test]
    fn test_crop_center_rejects_smaller_source() {
        let device = NdArrayDevice::default();
        let x = Tensor::<TestBackend, 4>::ones([1, 1, 4, 8], &device);

        match crop_center_to(x, [6, 6]) {
            Err(CropError::TooSmall {
                axis,
                actual,
                target,
            }) => {
                assert_eq!(axis, "height");
                assert_eq!(actual, 4);
                assert_eq!(target, 6);
            }
            _ => panic!("Expected TooSmall error"),
        }
    }
}
