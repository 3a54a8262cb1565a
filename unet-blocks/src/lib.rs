//! # unet-blocks
//!
//! Building-block layers for U-Net style image and spectrogram segmentation or
//! source-separation models, built on the Burn deep learning framework.
//!
//! ## Modules
//!
//! - `config`: Shared configuration enums (`ActivationKind`) and the forward `Mode`.
//! - `error`: Defines the custom error types used throughout the crate.
//! - `layers`: The blocks themselves: `Conv2dBnActiv`, `SeparableConv2dBnActiv`,
//!   `Cbam`, `Encoder`, `Decoder`, `DecoderV2` and `Aspp`.
//!
//! ## Dataflow
//!
//! A containing model chains `Encoder`s to downsample, passes the deepest features
//! through `Aspp` and/or `Cbam`, then chains decoders in reverse order, handing each
//! one the skip tensor of the matching encoder. Training versus inference behaviour
//! is selected per call with [`Mode`].

mod config;
mod error;
mod layers;


#[doc(inline)]
pub use config::{ActivationKind, Mode};
#[doc(inline)]
pub use error::{LayerError, LayerResult};
#[doc(inline)]
pub use layers::{
    Activation, Aspp, AsppConfig, BatchNorm2d, BatchNorm2dConfig, Cbam, CbamConfig,
    Conv2dBnActiv, Conv2dBnActivConfig, Decoder, DecoderConfig, DecoderV2, DecoderV2Config,
    Encoder, EncoderConfig, SeparableConv2dBnActiv,
};
#[doc(inline)]
pub use burn_extra_ops::{crop_center, CropError};
