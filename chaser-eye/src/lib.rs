//! chaser-eye: target detection for the chaser controller
//!
//! Scans raw camera buffers for the bright target and converts decoded
//! images into [`chaser_core::Frame`] values.

pub mod convert;
pub mod locator;

pub use convert::{frame_from_image, frame_from_path};
pub use locator::{locate, Locator};
