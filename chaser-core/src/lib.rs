//! chaser-core: shared types for the chaser visual-servo controller
//!
//! A camera [`Frame`] is scanned into a [`Detection`], which the motion policy
//! turns into a velocity [`Command`]. The thresholds driving both steps live
//! in [`PolicyThresholds`], part of the wider [`ChaserConfig`].

pub mod command;
pub mod config;
pub mod detection;
pub mod error;
pub mod frame;

pub use command::Command;
pub use config::{ChaserConfig, LocatorConfig, PixelMatch, PolicyThresholds, RuntimeConfig};
pub use detection::Detection;
pub use error::{ConfigError, DispatchError, SourceError};
pub use frame::{Frame, PixelEncoding};
