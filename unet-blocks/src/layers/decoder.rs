//! # Decoder Blocks
//!
//! Upsampling blocks that consume a skip tensor from the matching encoder.
//!
//! - `Decoder` upsamples first, then center-crops to the skip's spatial size. It
//!   tolerates the off-by-one sizes that odd encoder resolutions produce.
//! - `DecoderV2` concatenates the skip first, at the input's resolution, then
//!   projects and upsamples. Input and skip must already agree spatially.

use burn::{
    prelude::*,
    tensor::{
        module::interpolate,
        ops::{InterpolateMode, InterpolateOptions},
    },
};
use burn_extra_ops::{crop_center, ChannelDropout, ChannelDropoutConfig};

use super::{Conv2dBnActiv, Conv2dBnActivConfig};
use crate::config::{ActivationKind, Mode};
use crate::error::{LayerError, LayerResult};

const DROPOUT_PROB: f64 = 0.1;

/// Bilinear 2x upsampling. Input corner pixels land exactly on output corner pixels.
fn upsample2x<B: Backend>(x: Tensor<B, 4>) -> Tensor<B, 4> {
    let [_, _, height, width] = x.dims();
    interpolate(
        x,
        [height * 2, width * 2],
        InterpolateOptions::new(InterpolateMode::Bilinear),
    )
}

fn init_dropout(enabled: bool) -> Option<ChannelDropout> {
    enabled.then(|| ChannelDropoutConfig::new().with_prob(DROPOUT_PROB).init())
}

fn apply_dropout<B: Backend>(
    dropout: Option<&ChannelDropout>,
    x: Tensor<B, 4>,
    mode: Mode,
) -> Tensor<B, 4> {
    match dropout {
        Some(dropout) => dropout.forward(x, mode.is_training()),
        None => x,
    }
}

/// Configuration for the `Decoder` module.
#[derive(Config, Debug)]
pub struct DecoderConfig {
    /// Number of input channels.
    pub in_channels: usize,
    /// Number of output channels.
    pub out_channels: usize,
    #[config(default = "3")]
    pub kernel_size: usize,
    #[config(default = "1")]
    pub padding: usize,
    /// Apply channel dropout (p = 0.1) after the convolution in training mode.
    #[config(default = "false")]
    pub dropout: bool,
    #[config(default = "ActivationKind::Relu")]
    pub activation: ActivationKind,
}

impl DecoderConfig {
    /// Initializes a new `Decoder` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> LayerResult<Decoder<B>> {
        let conv = Conv2dBnActivConfig::new(self.in_channels, self.out_channels)
            .with_kernel_size(self.kernel_size)
            .with_padding(self.padding)
            .with_activation(self.activation.clone())
            .init(device)?;

        tracing::debug!(
            in_channels = self.in_channels,
            out_channels = self.out_channels,
            dropout = self.dropout,
            "initializing decoder"
        );

        Ok(Decoder {
            conv,
            dropout: init_dropout(self.dropout),
        })
    }
}

/// Decoder block: upsample, center-crop to the skip tensor, convolve.
#[derive(Module, Debug)]
pub struct Decoder<B: Backend> {
    conv: Conv2dBnActiv<B>,
    dropout: Option<ChannelDropout>,
}

impl<B: Backend> Decoder<B> {
    /// Upsamples `x` by 2, crops it to `skip`'s height and width when a skip is given,
    /// then applies the convolution block.
    ///
    /// Only the skip's spatial size is used; its channels are not merged.
    ///
    /// # Errors
    /// Returns [`LayerError::Crop`] when the upsampled tensor is smaller than `skip`.
    pub fn forward(
        &self,
        x: Tensor<B, 4>,
        skip: Option<&Tensor<B, 4>>,
        mode: Mode,
    ) -> LayerResult<Tensor<B, 4>> {
        let mut x = upsample2x(x);
        if let Some(skip) = skip {
            let [_, _, height, width] = x.dims();
            let [_, _, skip_height, skip_width] = skip.dims();
            if [height, width] != [skip_height, skip_width] {
                tracing::trace!(
                    from = ?[height, width],
                    to = ?[skip_height, skip_width],
                    "center-cropping upsampled features"
                );
            }
            x = crop_center(x, skip)?;
        }
        let h = self.conv.forward(x, mode);

        Ok(apply_dropout(self.dropout.as_ref(), h, mode))
    }
}

/// Configuration for the `DecoderV2` module.
#[derive(Config, Debug)]
pub struct DecoderV2Config {
    /// Number of input channels, including the skip tensor's channels when one is merged.
    pub in_channels: usize,
    /// Number of output channels.
    pub out_channels: usize,
    #[config(default = "3")]
    pub kernel_size: usize,
    #[config(default = "1")]
    pub padding: usize,
    /// Apply channel dropout (p = 0.1) after the last convolution in training mode.
    #[config(default = "false")]
    pub dropout: bool,
    #[config(default = "ActivationKind::Relu")]
    pub activation: ActivationKind,
}

impl DecoderV2Config {
    /// Initializes a new `DecoderV2` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> LayerResult<DecoderV2<B>> {
        let conv1 = Conv2dBnActivConfig::new(self.in_channels, self.out_channels)
            .with_kernel_size(1)
            .with_padding(0)
            .with_activation(self.activation.clone())
            .init(device)?;
        let conv2 = Conv2dBnActivConfig::new(self.out_channels, self.out_channels)
            .with_kernel_size(self.kernel_size)
            .with_padding(self.padding)
            .with_activation(self.activation.clone())
            .init(device)?;

        tracing::debug!(
            in_channels = self.in_channels,
            out_channels = self.out_channels,
            dropout = self.dropout,
            "initializing decoder v2"
        );

        Ok(DecoderV2 {
            conv1,
            conv2,
            dropout: init_dropout(self.dropout),
        })
    }
}

/// Decoder block: concatenate the skip tensor, project with a 1x1 convolution,
/// upsample, convolve.
#[derive(Module, Debug)]
pub struct DecoderV2<B: Backend> {
    conv1: Conv2dBnActiv<B>,
    conv2: Conv2dBnActiv<B>,
    dropout: Option<ChannelDropout>,
}

impl<B: Backend> DecoderV2<B> {
    /// # Errors
    /// Returns [`LayerError::InvalidTensorShape`] when `skip` and `x` differ in batch
    /// size or spatial size. No cropping is attempted.
    ///
    /// # Shapes
    /// - x: `[batch_size, channels_x, height, width]`
    /// - skip: `[batch_size, channels_skip, height, width]`
    /// - output: `[batch_size, out_channels, 2 * height, 2 * width]`
    pub fn forward(
        &self,
        x: Tensor<B, 4>,
        skip: Option<&Tensor<B, 4>>,
        mode: Mode,
    ) -> LayerResult<Tensor<B, 4>> {
        let x = match skip {
            Some(skip) => {
                let [batch_size, _, height, width] = x.dims();
                let [skip_batch, skip_channels, skip_height, skip_width] = skip.dims();
                if [skip_batch, skip_height, skip_width] != [batch_size, height, width] {
                    return Err(LayerError::InvalidTensorShape {
                        expected: format!("[{batch_size}, {skip_channels}, {height}, {width}]"),
                        actual: format!(
                            "[{skip_batch}, {skip_channels}, {skip_height}, {skip_width}]"
                        ),
                    });
                }
                Tensor::cat(vec![x, skip.clone()], 1)
            }
            None => x,
        };

        let h = self.conv1.forward(x, mode);
        let h = upsample2x(h);
        let h = self.conv2.forward(h, mode);

        Ok(apply_dropout(self.dropout.as_ref(), h, mode))
    }
}
