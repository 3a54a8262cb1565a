//! Compile-time backend choice for the demos.
//!
//! `cuda` wins over `wgpu`; without either feature the CPU `NdArray` backend is used.

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(feature = "cuda")] {
        pub type DemoBackend = burn::backend::cuda::Cuda;
        pub const BACKEND_NAME: &str = "CUDA (NVIDIA GPU)";
    } else if #[cfg(feature = "wgpu")] {
        pub type DemoBackend = burn::backend::wgpu::Wgpu;
        pub const BACKEND_NAME: &str = "WGPU (GPU)";
    } else {
        pub type DemoBackend = burn::backend::ndarray::NdArray;
        pub const BACKEND_NAME: &str = "NdArray (CPU)";
    }
}

/// Device of the selected backend.
pub type DemoDevice = burn::tensor::Device<DemoBackend>;

/// Default device of the selected backend.
pub fn demo_device() -> DemoDevice {
    DemoDevice::default()
}
