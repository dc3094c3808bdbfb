//! High-level flash operations
//!
//! This module provides the flash image model and the page-oriented
//! program/verify and read-back pipelines.

mod debug_device;
mod image;
mod operations;
mod session;

pub use debug_device::CcDebugDevice;
pub use image::*;
pub use operations::*;
pub use session::DeviceSession;
