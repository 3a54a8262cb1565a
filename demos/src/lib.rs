//! Shared helpers for the unet-blocks demos.

pub mod backend;
