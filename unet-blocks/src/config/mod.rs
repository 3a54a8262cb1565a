//! Configuration module for the U-Net blocks.
//!
//! Block-specific configurations (`EncoderConfig`, `AsppConfig`, ...) live next to
//! their modules. This module holds the enums shared between blocks:
//! - `enums`: activation selection and the forward `Mode`

pub mod enums;

pub use enums::{ActivationKind, Mode};
