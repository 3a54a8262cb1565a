//! # Encoder Block
//!
//! One level of the contracting path: a full-resolution convolution whose output
//! is kept as the skip tensor, followed by a strided convolution.

use burn::prelude::*;

use super::{Conv2dBnActiv, Conv2dBnActivConfig};
use crate::config::{ActivationKind, Mode};
use crate::error::LayerResult;

/// Configuration for the `Encoder` module.
#[derive(Config, Debug)]
pub struct EncoderConfig {
    /// Number of input channels.
    pub in_channels: usize,
    /// Number of output channels, shared by the skip and downsampled tensors.
    pub out_channels: usize,
    #[config(default = "3")]
    pub kernel_size: usize,
    /// Stride of the second (downsampling) convolution.
    #[config(default = "1")]
    pub stride: usize,
    #[config(default = "1")]
    pub padding: usize,
    #[config(default = "ActivationKind::LeakyRelu")]
    pub activation: ActivationKind,
}

impl EncoderConfig {
    fn skip_conv(&self) -> Conv2dBnActivConfig {
        Conv2dBnActivConfig::new(self.in_channels, self.out_channels)
            .with_kernel_size(self.kernel_size)
            .with_padding(self.padding)
            .with_activation(self.activation.clone())
    }

    fn down_conv(&self) -> Conv2dBnActivConfig {
        Conv2dBnActivConfig::new(self.out_channels, self.out_channels)
            .with_kernel_size(self.kernel_size)
            .with_stride(self.stride)
            .with_padding(self.padding)
            .with_activation(self.activation.clone())
    }

    /// Spatial sizes of `(out, skip)` for an input of `[height, width]`.
    pub fn output_sizes(&self, input: [usize; 2]) -> ([usize; 2], [usize; 2]) {
        let skip = self.skip_conv().output_size(input);
        (self.down_conv().output_size(skip), skip)
    }

    /// Initializes a new `Encoder` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> LayerResult<Encoder<B>> {
        let conv1 = self.skip_conv().init(device)?;
        let conv2 = self.down_conv().init(device)?;

        tracing::debug!(
            in_channels = self.in_channels,
            out_channels = self.out_channels,
            stride = self.stride,
            "initializing encoder"
        );

        Ok(Encoder { conv1, conv2 })
    }
}

/// Encoder block: a full-resolution convolution producing the skip tensor, then a
/// strided convolution producing the downsampled output.
#[derive(Module, Debug)]
pub struct Encoder<B: Backend> {
    conv1: Conv2dBnActiv<B>,
    conv2: Conv2dBnActiv<B>,
}

impl<B: Backend> Encoder<B> {
    /// Returns `(out, skip)`.
    ///
    /// # Shapes
    /// - input: `[batch_size, in_channels, height, width]`
    /// - out: `[batch_size, out_channels, height / stride, width / stride]`
    /// - skip: `[batch_size, out_channels, height, width]`
    pub fn forward(&self, x: Tensor<B, 4>, mode: Mode) -> (Tensor<B, 4>, Tensor<B, 4>) {
        let skip = self.conv1.forward(x, mode);
        let out = self.conv2.forward(skip.clone(), mode);

        (out, skip)
    }
}
