//! # Batch Normalization
//!
//! A 2D batch normalization whose training/inference behaviour is chosen by the
//! caller through [`Mode`] instead of by the backend type.

use burn::{
    module::{Param, RunningState},
    nn::Initializer,
    prelude::*,
};

use crate::config::Mode;

/// Configuration for the `BatchNorm2d` module.
#[derive(Config, Debug)]
pub struct BatchNorm2dConfig {
    /// Number of channels.
    pub num_features: usize,
    /// Value added to the variance for numerical stability.
    #[config(default = "1e-5")]
    pub epsilon: f64,
    /// Weight of the current batch in the running-statistics update.
    #[config(default = "0.1")]
    pub momentum: f64,
}

impl BatchNorm2dConfig {
    /// Initializes a new `BatchNorm2d` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> BatchNorm2d<B> {
        let gamma = Initializer::Ones.init([self.num_features], device);
        let beta = Initializer::Zeros.init([self.num_features], device);

        let running_mean = Tensor::zeros([self.num_features], device);
        let running_var = Tensor::ones([self.num_features], device);

        BatchNorm2d {
            gamma,
            beta,
            running_mean: RunningState::new(running_mean),
            running_var: RunningState::new(running_var),
            momentum: self.momentum,
            epsilon: self.epsilon,
        }
    }
}

/// Per-channel normalization over the batch and spatial dimensions.
#[derive(Module, Debug)]
pub struct BatchNorm2d<B: Backend> {
    gamma: Param<Tensor<B, 1>>,
    beta: Param<Tensor<B, 1>>,
    running_mean: RunningState<Tensor<B, 1>>,
    running_var: RunningState<Tensor<B, 1>>,
    momentum: f64,
    epsilon: f64,
}

impl<B: Backend> BatchNorm2d<B> {
    /// Normalizes `x` with batch statistics in [`Mode::Train`] (updating the running
    /// statistics) or with the running statistics in [`Mode::Inference`].
    ///
    /// # Shapes
    /// - input: `[batch_size, channels, height, width]`
    /// - output: `[batch_size, channels, height, width]`
    pub fn forward(&self, x: Tensor<B, 4>, mode: Mode) -> Tensor<B, 4> {
        match mode {
            Mode::Train => self.forward_train(x),
            Mode::Inference => self.forward_inference(x),
        }
    }

    /// The running mean of each channel.
    pub fn running_mean(&self) -> Tensor<B, 1> {
        self.running_mean.value_sync()
    }

    /// The running (unbiased) variance of each channel.
    pub fn running_var(&self) -> Tensor<B, 1> {
        self.running_var.value_sync()
    }

    fn forward_inference(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let device = x.device();
        let channels = x.dims()[1];

        // Synced so that a train step is visible to the next inference call.
        let mean = self.running_mean.value_sync().to_device(&device);
        let var = self.running_var.value_sync().to_device(&device);

        self.normalize(
            x,
            mean.reshape([1, channels, 1, 1]),
            var.reshape([1, channels, 1, 1]),
        )
    }

    fn forward_train(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let device = x.device();
        let [batch_size, channels, height, width] = x.dims();
        let count = batch_size * height * width;

        // [channels, batch * height * width]
        let flat = x.clone().swap_dims(0, 1).reshape([channels, count]);
        let mean = flat.clone().mean_dim(1);
        let var = flat.sub(mean.clone()).powf_scalar(2.0).mean_dim(1);

        let unbiased = if count > 1 {
            count as f64 / (count - 1) as f64
        } else {
            1.0
        };

        let running_mean = self
            .running_mean
            .value_sync()
            .to_device(&device)
            .mul_scalar(1.0 - self.momentum)
            .add(
                mean.clone()
                    .detach()
                    .reshape([channels])
                    .mul_scalar(self.momentum),
            );
        let running_var = self
            .running_var
            .value_sync()
            .to_device(&device)
            .mul_scalar(1.0 - self.momentum)
            .add(
                var.clone()
                    .detach()
                    .reshape([channels])
                    .mul_scalar(self.momentum * unbiased),
            );

        self.running_mean.update(running_mean.detach());
        self.running_var.update(running_var.detach());

        self.normalize(
            x,
            mean.reshape([1, channels, 1, 1]),
            var.reshape([1, channels, 1, 1]),
        )
    }

    fn normalize(&self, x: Tensor<B, 4>, mean: Tensor<B, 4>, var: Tensor<B, 4>) -> Tensor<B, 4> {
        let channels = x.dims()[1];
        let std = var.add_scalar(self.epsilon).sqrt();

        let gamma = self.gamma.val().reshape([1, channels, 1, 1]);
        let beta = self.beta.val().reshape([1, channels, 1, 1]);

        x.sub(mean).div(std).mul(gamma).add(beta)
    }
}
