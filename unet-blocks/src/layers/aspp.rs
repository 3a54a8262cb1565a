//! # Atrous Spatial Pyramid Pooling (ASPP)
//!
//! Aggregates multi-scale context at the bottleneck without reducing resolution:
//! a global pooling branch, a 1x1 branch and three dilated separable branches run
//! in parallel and are projected back to the input channel count.

use burn::{
    nn::pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig},
    prelude::*,
    tensor::{
        module::interpolate,
        ops::{InterpolateMode, InterpolateOptions},
    },
};
use burn_extra_ops::{ChannelDropout, ChannelDropoutConfig};

use super::{Conv2dBnActiv, Conv2dBnActivConfig, SeparableConv2dBnActiv};
use crate::config::{ActivationKind, Mode};
use crate::error::{LayerError, LayerResult};

/// Number of parallel branches concatenated before the bottleneck.
const BRANCHES: usize = 5;

/// Configuration for the `Aspp` module.
#[derive(Config, Debug)]
pub struct AsppConfig {
    /// Number of input (and output) channels.
    pub in_channels: usize,
    /// Dilation rates of the three separable branches.
    #[config(default = "[4, 8, 16]")]
    pub dilations: [usize; 3],
    /// Drop probability of the channel dropout after the bottleneck.
    #[config(default = "0.1")]
    pub dropout: f64,
}

impl AsppConfig {
    fn pointwise(&self, in_channels: usize) -> Conv2dBnActivConfig {
        Conv2dBnActivConfig::new(in_channels, self.in_channels)
            .with_kernel_size(1)
            .with_padding(0)
            .with_activation(ActivationKind::LeakyRelu)
    }

    pub fn validate(&self) -> LayerResult<()> {
        if self.in_channels == 0 {
            return Err(LayerError::InvalidConfiguration {
                reason: "ASPP in_channels must be greater than 0".to_string(),
            });
        }
        if self.dilations.contains(&0) {
            return Err(LayerError::InvalidConfiguration {
                reason: format!("ASPP dilations must be positive, got {:?}", self.dilations),
            });
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(LayerError::InvalidConfiguration {
                reason: format!("ASPP dropout must be in [0, 1), got {}", self.dropout),
            });
        }
        Ok(())
    }

    /// Initializes a new `Aspp` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> LayerResult<Aspp<B>> {
        self.validate()?;
        tracing::debug!(
            channels = self.in_channels,
            dilations = ?self.dilations,
            "initializing ASPP"
        );

        let dilated = self
            .dilations
            .iter()
            .map(|&rate| {
                Conv2dBnActivConfig::new(self.in_channels, self.in_channels)
                    .with_kernel_size(3)
                    .with_padding(rate)
                    .with_dilation(rate)
                    .with_activation(ActivationKind::LeakyRelu)
                    .init_separable(device)
            })
            .collect::<LayerResult<Vec<_>>>()?;

        Ok(Aspp {
            pool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            pooled_conv: self.pointwise(self.in_channels).init(device)?,
            conv: self.pointwise(self.in_channels).init(device)?,
            dilated,
            bottleneck: self.pointwise(self.in_channels * BRANCHES).init(device)?,
            dropout: ChannelDropoutConfig::new().with_prob(self.dropout).init(),
        })
    }
}

/// Atrous Spatial Pyramid Pooling module.
#[derive(Module, Debug)]
pub struct Aspp<B: Backend> {
    // global context branch
    pool: AdaptiveAvgPool2d,
    pooled_conv: Conv2dBnActiv<B>,
    conv: Conv2dBnActiv<B>,
    dilated: Vec<SeparableConv2dBnActiv<B>>,
    bottleneck: Conv2dBnActiv<B>,
    dropout: ChannelDropout,
}

impl<B: Backend> Aspp<B> {
    /// # Shapes
    /// - input: `[batch_size, channels, height, width]`
    /// - output: `[batch_size, channels, height, width]`
    pub fn forward(&self, x: Tensor<B, 4>, mode: Mode) -> Tensor<B, 4> {
        let [_, _, height, width] = x.dims();

        let pooled = self
            .pooled_conv
            .forward(self.pool.forward(x.clone()), mode);
        let pooled = interpolate(
            pooled,
            [height, width],
            InterpolateOptions::new(InterpolateMode::Bilinear),
        );

        let mut branches = Vec::with_capacity(BRANCHES);
        branches.push(pooled);
        branches.push(self.conv.forward(x.clone(), mode));
        branches.extend(
            self.dilated
                .iter()
                .map(|branch| branch.forward(x.clone(), mode)),
        );

        let x = Tensor::cat(branches, 1);
        let x = self.bottleneck.forward(x, mode);

        self.dropout.forward(x, mode.is_training())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_aspp_preserves_shape() {
        let device = Default::default();
        let aspp = AsppConfig::new(8).init::<TestBackend>(&device).unwrap();
        let input = Tensor::<TestBackend, 4>::random(
            [2, 8, 12, 10],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );

        let output = aspp.forward(input.clone(), Mode::Inference);
        assert_eq!(output.dims(), [2, 8, 12, 10]);

        let output = aspp.forward(input, Mode::Train);
        assert_eq!(output.dims(), [2, 8, 12, 10]);
    }

    #[test]
    fn test_aspp_custom_dilations() {
        let device = Default::default();
        let aspp = AsppConfig::new(4)
            .with_dilations([1, 2, 3])
            .init::<TestBackend>(&device)
            .unwrap();
        let input = Tensor::<TestBackend, 4>::zeros([1, 4, 7, 9], &device);

        assert_eq!(aspp.forward(input, Mode::Inference).dims(), [1, 4, 7, 9]);
    }

    #[test]
    fn test_aspp_inference_is_deterministic() {
        let device = Default::default();
        let aspp = AsppConfig::new(6).init::<TestBackend>(&device).unwrap();
        let input = Tensor::<TestBackend, 4>::random(
            [1, 6, 8, 8],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );

        let a = aspp.forward(input.clone(), Mode::Inference);
        let b = aspp.forward(input, Mode::Inference);
        assert_eq!((a - b).abs().sum().into_scalar(), 0.0);
    }

    #[test]
    fn test_aspp_dropout_zeroes_whole_planes_in_train() {
        let device = Default::default();
        let aspp = AsppConfig::new(16).init::<TestBackend>(&device).unwrap();
        let input = Tensor::<TestBackend, 4>::random(
            [8, 16, 6, 6],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );

        // The bottleneck ends in LeakyReLU: only dropout yields all-zero planes.
        let zeros = aspp
            .forward(input, Mode::Train)
            .reshape([8 * 16, 36])
            .equal_elem(0.0)
            .float()
            .sum_dim(1)
            .into_data()
            .to_vec::<f32>()
            .unwrap();
        let dropped = zeros.iter().filter(|&&n| n == 36.0).count();
        let partial = zeros.iter().filter(|&&n| n > 0.0 && n < 36.0).count();

        assert_eq!(partial, 0);
        assert!(dropped > 0 && dropped < 64, "{dropped} of 128 planes dropped");
    }

    #[test]
    fn test_aspp_rejects_dropout_of_one() {
        let device = Default::default();

        match AsppConfig::new(4)
            .with_dropout(1.0)
            .init::<TestBackend>(&device)
        {
            Err(LayerError::InvalidConfiguration { reason }) => {
                assert!(reason.contains("dropout"));
            }
            _ => panic!("Expected InvalidConfiguration error"),
        }
    }

    #[test]
    fn test_aspp_rejects_zero_dilation() {
        let device = Default::default();

        match AsppConfig::new(4)
            .with_dilations([4, 0, 16])
            .init::<TestBackend>(&device)
        {
            Err(LayerError::InvalidConfiguration { reason }) => {
                assert!(reason.contains("dilations"));
            }
            _ => panic!("Expected InvalidConfiguration error"),
        }
    }
}
