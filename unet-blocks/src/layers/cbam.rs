//! # Convolutional Block Attention Module (CBAM)
//!
//! Reweights a feature map twice: first per channel, from globally pooled
//! descriptors passed through a shared bottleneck MLP, then per pixel, from
//! channel-pooled maps passed through a small convolution.

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        Linear, LinearConfig, PaddingConfig2d, Relu,
    },
    prelude::*,
    tensor::activation::sigmoid,
};

use crate::error::{LayerError, LayerResult};

/// Configuration for the `Cbam` module.
#[derive(Config, Debug)]
pub struct CbamConfig {
    /// Number of channels of the gated feature map.
    pub channels: usize,
    /// Reduction ratio of the channel-attention bottleneck.
    #[config(default = "16")]
    pub ratio: usize,
}

impl CbamConfig {
    /// Width of the channel-attention bottleneck.
    pub const fn hidden_channels(&self) -> usize {
        match self.ratio {
            0 => 0,
            ratio => self.channels / ratio,
        }
    }

    pub fn validate(&self) -> LayerResult<()> {
        if self.ratio == 0 {
            return Err(LayerError::InvalidConfiguration {
                reason: "CBAM ratio must be greater than 0".to_string(),
            });
        }
        if self.hidden_channels() == 0 {
            return Err(LayerError::InvalidConfiguration {
                reason: format!(
                    "CBAM channels ({}) must be at least the ratio ({})",
                    self.channels, self.ratio
                ),
            });
        }
        Ok(())
    }

    /// Initializes a new `Cbam` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> LayerResult<Cbam<B>> {
        self.validate()?;
        let hidden = self.hidden_channels();
        tracing::debug!(channels = self.channels, hidden, "initializing CBAM");

        let squeeze = LinearConfig::new(self.channels, hidden).init(device);
        let excite = LinearConfig::new(hidden, self.channels).init(device);
        // Average and max maps stacked along the channel axis.
        let conv = Conv2dConfig::new([2, 1], [3, 3])
            .with_stride([1, 1])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .with_bias(false)
            .init(device);

        Ok(Cbam {
            squeeze,
            relu: Relu::new(),
            excite,
            conv,
        })
    }
}

/// Channel and spatial attention gate.
#[derive(Module, Debug)]
pub struct Cbam<B: Backend> {
    squeeze: Linear<B>,
    relu: Relu,
    excite: Linear<B>,
    conv: Conv2d<B>,
}

impl<B: Backend> Cbam<B> {
    /// # Shapes
    /// - input: `[batch_size, channels, height, width]`
    /// - output: `[batch_size, channels, height, width]`
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let [batch_size, channels, _, _] = x.dims();

        let channel_weights = self
            .channel_attention(x.clone())
            .reshape([batch_size, channels, 1, 1]);
        let x = x * channel_weights;

        let spatial_weights = self.spatial_attention(x.clone());
        x * spatial_weights
    }

    /// Sigmoid channel weights of shape `[batch_size, channels]`.
    pub fn channel_attention(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let [batch_size, channels, _, _] = x.dims();

        let avg = x.clone().mean_dim(3).mean_dim(2).reshape([batch_size, channels]);
        let max = x.max_dim(3).max_dim(2).reshape([batch_size, channels]);

        sigmoid(self.bottleneck(avg) + self.bottleneck(max))
    }

    /// Sigmoid spatial weights of shape `[batch_size, 1, height, width]`.
    pub fn spatial_attention(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let avg = x.clone().mean_dim(1);
        let max = x.max_dim(1);

        sigmoid(self.conv.forward(Tensor::cat(vec![avg, max], 1)))
    }

    fn bottleneck(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        self.excite.forward(self.relu.forward(self.squeeze.forward(x)))
    }
}
