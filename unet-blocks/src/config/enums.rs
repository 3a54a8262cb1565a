//! Enumeration types shared by the block configurations.

use burn::prelude::*;

/// Defines the pointwise activation applied after normalization.
#[derive(Config, Debug, PartialEq, Eq)]
pub enum ActivationKind {
    /// Rectified linear unit.
    Relu,
    /// Leaky rectified linear unit with a negative slope of 0.01.
    LeakyRelu,
    /// Gaussian error linear unit.
    Gelu,
}

/// Whether a forward pass runs in training or inference mode.
///
/// Training mode normalizes with batch statistics, updates the running
/// statistics and enables dropout. Inference mode uses the running statistics
/// and disables dropout, so it is deterministic for fixed parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Batch statistics, running-statistics updates, dropout enabled.
    Train,
    /// Running statistics, dropout disabled.
    #[default]
    Inference,
}

impl Mode {
    /// Returns `true` for [`Mode::Train`].
    #[must_use]
    pub const fn is_training(self) -> bool {
        matches!(self, Self::Train)
    }
}
