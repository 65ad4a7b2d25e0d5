//! GPU device + surface management.
//!
//! Owns the wgpu Instance/Adapter/Device/Queue, configures the window
//! surface and hands out per-frame encoders.

mod error;
mod frame;
mod gpu;
mod init;
mod surface;

pub use error::{DeviceError, SurfaceErrorAction};
pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::GpuInit;
