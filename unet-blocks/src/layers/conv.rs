//! # Convolution Blocks
//!
//! The atomic blocks of the network: a bias-free convolution followed by batch
//! normalization and an activation, in a dense and a depthwise-separable variant.

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        PaddingConfig2d,
    },
    prelude::*,
};

use super::{Activation, BatchNorm2d, BatchNorm2dConfig};
use crate::config::{ActivationKind, Mode};
use crate::error::{LayerError, LayerResult};

/// Configuration for the `Conv2dBnActiv` and `SeparableConv2dBnActiv` modules.
#[derive(Config, Debug)]
pub struct Conv2dBnActivConfig {
    /// Number of input channels.
    pub in_channels: usize,
    /// Number of output channels.
    pub out_channels: usize,
    /// Size of the square kernel.
    #[config(default = "3")]
    pub kernel_size: usize,
    #[config(default = "1")]
    pub stride: usize,
    /// Zero padding added to each spatial border.
    #[config(default = "1")]
    pub padding: usize,
    #[config(default = "1")]
    pub dilation: usize,
    /// Activation applied after normalization.
    #[config(default = "ActivationKind::Relu")]
    pub activation: ActivationKind,
}

impl Conv2dBnActivConfig {
    /// Checks that every size in the configuration is non-zero.
    pub fn validate(&self) -> LayerResult<()> {
        let sizes = [
            ("in_channels", self.in_channels),
            ("out_channels", self.out_channels),
            ("kernel_size", self.kernel_size),
            ("stride", self.stride),
            ("dilation", self.dilation),
        ];
        match sizes.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(LayerError::InvalidConfiguration {
                reason: format!("{name} must be greater than 0"),
            }),
            None => Ok(()),
        }
    }

    /// Computes the spatial output size for an input of `[height, width]`.
    ///
    /// Follows the convolution formula `(n + 2p - d(k - 1) - 1) / s + 1`. Returns 0 for
    /// an axis the receptive field does not fit in.
    pub fn output_size(&self, [height, width]: [usize; 2]) -> [usize; 2] {
        let extent = self.dilation * self.kernel_size.saturating_sub(1) + 1;
        let axis = |n: usize| match (n + 2 * self.padding).checked_sub(extent) {
            Some(span) => span / self.stride + 1,
            None => 0,
        };
        [axis(height), axis(width)]
    }

    fn conv_config(&self, channels: [usize; 2], kernel_size: usize) -> Conv2dConfig {
        Conv2dConfig::new(channels, [kernel_size, kernel_size]).with_bias(false)
    }

    /// Initializes a new `Conv2dBnActiv` module.
    ///
    /// # Errors
    /// Returns [`LayerError::InvalidConfiguration`] when [`validate`](Self::validate) fails.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> LayerResult<Conv2dBnActiv<B>> {
        self.validate()?;
        let conv = self
            .conv_config([self.in_channels, self.out_channels], self.kernel_size)
            .with_stride([self.stride, self.stride])
            .with_padding(PaddingConfig2d::Explicit(self.padding, self.padding))
            .with_dilation([self.dilation, self.dilation])
            .init(device);
        let bn = BatchNorm2dConfig::new(self.out_channels).init(device);

        Ok(Conv2dBnActiv {
            conv,
            bn,
            activation: self.activation.init(),
        })
    }

    /// Initializes a new `SeparableConv2dBnActiv` module with the same geometry.
    pub fn init_separable<B: Backend>(
        &self,
        device: &Device<B>,
    ) -> LayerResult<SeparableConv2dBnActiv<B>> {
        self.validate()?;
        let depthwise = self
            .conv_config([self.in_channels, self.in_channels], self.kernel_size)
            .with_stride([self.stride, self.stride])
            .with_padding(PaddingConfig2d::Explicit(self.padding, self.padding))
            .with_dilation([self.dilation, self.dilation])
            .with_groups(self.in_channels)
            .init(device);
        let pointwise = self
            .conv_config([self.in_channels, self.out_channels], 1)
            .init(device);
        let bn = BatchNorm2dConfig::new(self.out_channels).init(device);

        Ok(SeparableConv2dBnActiv {
            depthwise,
            pointwise,
            bn,
            activation: self.activation.init(),
        })
    }
}

/// Convolution, batch normalization and activation.
#[derive(Module, Debug)]
pub struct Conv2dBnActiv<B: Backend> {
    conv: Conv2d<B>,
    bn: BatchNorm2d<B>,
    activation: Activation,
}

impl<B: Backend> Conv2dBnActiv<B> {
    /// # Shapes
    /// - input: `[batch_size, in_channels, height, width]`
    /// - output: `[batch_size, out_channels, height_out, width_out]`
    pub fn forward(&self, x: Tensor<B, 4>, mode: Mode) -> Tensor<B, 4> {
        let x = self.conv.forward(x);
        let x = self.bn.forward(x, mode);

        self.activation.forward(x)
    }

    pub const fn bn(&self) -> &BatchNorm2d<B> {
        &self.bn
    }
}

/// Depthwise convolution, pointwise 1x1 convolution, batch normalization and activation.
#[derive(Module, Debug)]
pub struct SeparableConv2dBnActiv<B: Backend> {
    depthwise: Conv2d<B>,
    pointwise: Conv2d<B>,
    bn: BatchNorm2d<B>,
    activation: Activation,
}

impl<B: Backend> SeparableConv2dBnActiv<B> {
    pub fn forward(&self, x: Tensor<B, 4>, mode: Mode) -> Tensor<B, 4> {
        let x = self.depthwise.forward(x);
        let x = self.pointwise.forward(x);
        let x = self.bn.forward(x, mode);

        self.activation.forward(x)
    }
}
