//! Velocity commands sent to the drive

use serde::{Deserialize, Serialize};
use std::fmt;

/// Velocity directive: forward speed and turn rate.
///
/// Serialized as `{"linear_x": .., "angular_z": ..}`, the shape of the drive
/// request understood by the motor controller service.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Command {
    #[serde(rename = "linear_x")]
    pub linear: f64,
    #[serde(rename = "angular_z")]
    pub angular: f64,
}

impl Command {
    /// Both velocities zero
    pub const STOP: Command = Command {
        linear: 0.0,
        angular: 0.0,
    };

    pub fn new(linear: f64, angular: f64) -> Self {
        Self { linear, angular }
    }

    pub fn is_stop(&self) -> bool {
        self.linear == 0.0 && self.angular == 0.0
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "linear={:.3} angular={:.3}", self.linear, self.angular)
    }
}
