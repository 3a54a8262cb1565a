use burn_extra_ops::CropError;
use thiserror::Error;

/// The error type for `unet-blocks` operations.
///
/// Construction errors come from invalid block configurations; forward errors come
/// from the blocks that merge or crop a skip tensor.
#[derive(Error, Debug)]
pub enum LayerError {
    /// Error for when an invalid block configuration is provided.
    /// This can happen if configuration parameters are zero or logically inconsistent.
    #[error("Invalid block configuration: {reason}")]
    InvalidConfiguration {
        /// The reason why the configuration is invalid.
        reason: String,
    },

    /// Error for when an input tensor has an invalid shape.
    #[error("Invalid input tensor shape: expected {expected}, got {actual}")]
    InvalidTensorShape {
        /// The expected tensor shape.
        expected: String,
        /// The actual tensor shape.
        actual: String,
    },

    /// Error for when a feature map cannot be cropped to its skip tensor.
    #[error("Center crop failed: {0}")]
    Crop(#[from] CropError),
}

/// A specialized `Result` type for `unet-blocks` operations.
pub type LayerResult<T> = Result<T, LayerError>;
