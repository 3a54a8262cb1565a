//! # Channel Dropout
//!
//! Implements channel-wise (2D) dropout. During training, whole feature planes
//! are zeroed at random and the surviving planes are rescaled.

use burn::{prelude::*, tensor::Distribution};

/// Configuration for the `ChannelDropout` module.
#[derive(Config, Debug)]
pub struct ChannelDropoutConfig {
    /// The probability of zeroing a channel.
    #[config(default = "0.1")]
    pub prob: f64,
}

impl ChannelDropoutConfig {
    /// Initializes a new `ChannelDropout` module.
    pub const fn init(&self) -> ChannelDropout {
        ChannelDropout { prob: self.prob }
    }
}

/// Channel-wise dropout module.
#[derive(Module, Clone, Debug, Default)]
pub struct ChannelDropout {
    prob: f64,
}

impl ChannelDropout {
    /// The drop probability.
    pub const fn prob(&self) -> f64 {
        self.prob
    }

    /// Applies channel dropout to the input tensor.
    ///
    /// If `training` is false or the probability is 0, the input is returned unchanged.
    /// Otherwise every `(batch, channel)` plane is zeroed with probability `prob` and the
    /// kept planes are scaled by `1 / (1 - prob)`.
    ///
    /// # Shapes
    /// - input: `[batch_size, channels, height, width]`
    /// - output: `[batch_size, channels, height, width]`
    pub fn forward<B: Backend>(&self, x: Tensor<B, 4>, training: bool) -> Tensor<B, 4> {
        if !training || self.prob == 0.0 {
            return x;
        }
        let keep_prob = 1.0 - self.prob;
        let [batch_size, channels, _, _] = x.dims();

        // One draw per plane, broadcast over height and width.
        let mask = Tensor::random(
            [batch_size, channels, 1, 1],
            Distribution::Bernoulli(keep_prob),
            &x.device(),
        );

        x * mask / keep_prob
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::{
        backend::{ndarray::NdArrayDevice, NdArray},
        tensor::Tensor,
    };

    type TestBackend = NdArray;
    type TestDevice = NdArrayDevice;

    #[test]
    fn test_channel_dropout_eval_mode() {
        let device = TestDevice::default();
        let dropout = ChannelDropoutConfig::new().with_prob(0.5).init();

        let x = Tensor::<TestBackend, 4>::ones([2, 3, 4, 4], &device);
        let output = dropout.forward(x.clone(), false);

        let diff = (output - x).abs().sum();
        assert_eq!(
            diff.into_scalar(),
            0.0,
            "In evaluation mode, input and output should be equal"
        );
    }

    #[test]
    fn test_channel_dropout_zero_prob() {
        let device = TestDevice::default();
        let dropout = ChannelDropoutConfig::new().with_prob(0.0).init();

        let x = Tensor::<TestBackend, 4>::ones([2, 3, 4, 4], &device);
        let output = dropout.forward(x.clone(), true);

        let diff = (output - x).abs().sum();
        assert_eq!(diff.into_scalar(), 0.0);
    }

    #[test]
    fn test_channel_dropout_default_prob() {
        assert_eq!(ChannelDropoutConfig::new().init().prob(), 0.1);
    }

    #[test]
    fn test_channel_dropout_drops_whole_planes() {
        let device = TestDevice::default();
        let dropout = ChannelDropoutConfig::new().with_prob(0.5).init();

        let x = Tensor::<TestBackend, 4>::ones([4, 8, 3, 5], &device);
        let output = dropout.forward(x, true);
        assert_eq!(output.dims(), [4, 8, 3, 5]);

        // Every plane is either all zeros or all 2.0 (scaled by 1 / 0.5).
        for b in 0..4 {
            for c in 0..8 {
                let plane = output.clone().slice([b..b + 1, c..c + 1, 0..3, 0..5]);
                let sum = plane.sum().into_scalar();
                assert!(
                    sum.abs() < 1e-6 || (sum - 30.0).abs() < 1e-4,
                    "Plane ({b}, {c}) was partially dropped: sum {sum}"
                );
            }
        }
    }

    #[test]
    fn test_channel_dropout_rate() {
        let device = TestDevice::default();
        let dropout = ChannelDropoutConfig::new().with_prob(0.5).init();
        let x = Tensor::<TestBackend, 4>::ones([10, 10, 2, 2], &device);

        let mut dropped = 0;
        let num_trials = 20;
        for _ in 0..num_trials {
            let output = dropout.forward(x.clone(), true);
            // Per-plane sums: 0 when dropped.
            let sums = output.sum_dim(3).sum_dim(2).into_data();
            dropped += sums
                .to_vec::<f32>()
                .unwrap()
                .iter()
                .filter(|s| s.abs() < 1e-6)
                .count();
        }

        let rate = dropped as f64 / (num_trials * 100) as f64;
        assert!(
            (rate - 0.5).abs() < 0.1,
            "Actual drop rate {rate} deviates significantly from expected 0.5"
        );
    }
}
