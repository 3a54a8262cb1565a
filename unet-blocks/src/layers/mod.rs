//! # Layers
//!
//! The building blocks of a U-Net style segmentation / source-separation model:
//!
//! - `norm`: `BatchNorm2d` driven by an explicit [`Mode`](crate::Mode).
//! - `activation`: the `Activation` module selected by `ActivationKind`.
//! - `conv`: `Conv2dBnActiv` and its depthwise-separable variant.
//! - `cbam`: channel and spatial attention gate.
//! - `encoder`: downsampling block returning the skip tensor.
//! - `decoder`: upsampling blocks `Decoder` (crop) and `DecoderV2` (concatenate).
//! - `aspp`: atrous spatial pyramid pooling context module.

mod activation;
mod aspp;
mod cbam;
mod conv;
mod decoder;
mod encoder;
mod norm;

pub use activation::*;
pub use aspp::*;
pub use cbam::*;
pub use conv::*;
pub use decoder::*;
pub use encoder::*;
pub use norm::*;
