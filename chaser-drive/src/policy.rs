//! Three-zone motion policy: detection in, velocity command out

use chaser_core::{Command, Detection, PolicyThresholds};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Horizontal region of the frame the target sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    Left,
    Center,
    Right,
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Zone::Left => "left",
            Zone::Center => "center",
            Zone::Right => "right",
        };
        f.write_str(name)
    }
}

/// Average column of the two tracked pixels, `None` when nothing was found.
///
/// Integer arithmetic throughout, so the value is truncated toward zero.
pub fn mid_column(detection: Detection, stride: usize) -> Option<usize> {
    let (start_index, end_index) = detection.span()?;
    if stride == 0 {
        return None;
    }
    Some((start_index % stride + end_index % stride) / 2)
}

/// Zone of `mid_column` for a frame `stride` bytes wide.
///
/// The window is `stride / 3`; the center zone includes both of its edges.
pub fn classify(mid_column: usize, stride: usize) -> Zone {
    let window = stride / 3;
    if mid_column < window {
        Zone::Left
    } else if mid_column <= 2 * window {
        Zone::Center
    } else {
        Zone::Right
    }
}

/// Map a detection to a velocity command.
///
/// Nothing found stops the platform. Otherwise the platform turns in place
/// toward a target on either side, or drives straight at a centered one.
pub fn decide(detection: Detection, stride: usize, thresholds: &PolicyThresholds) -> Command {
    let Some(mid) = mid_column(detection, stride) else {
        return Command::STOP;
    };

    match classify(mid, stride) {
        Zone::Left => Command::new(0.0, thresholds.angular_speed),
        Zone::Center => Command::new(thresholds.linear_speed, 0.0),
        Zone::Right => Command::new(0.0, -thresholds.angular_speed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found_at(mid: usize) -> Detection {
        Detection::Found {
            start_index: mid,
            end_index: mid,
        }
    }

    #[test]
    fn test_not_found_stops() {
        let thresholds = PolicyThresholds::default();
        assert_eq!(decide(Detection::NotFound, 9, &thresholds), Command::STOP);
        assert_eq!(decide(Detection::NotFound, 0, &thresholds), Command::STOP);
    }

    #[test]
    fn test_zone_boundaries_stride_nine() {
        let thresholds = PolicyThresholds::default();
        assert_eq!(decide(found_at(2), 9, &thresholds), Command::new(0.0, 0.5));
        assert_eq!(decide(found_at(3), 9, &thresholds), Command::new(0.4, 0.0));
        assert_eq!(decide(found_at(6), 9, &thresholds), Command::new(0.4, 0.0));
        assert_eq!(decide(found_at(7), 9, &thresholds), Command::new(0.0, -0.5));
    }

    #[test]
    fn test_mid_column_uses_columns_not_indices() {
        // Row 1 col 1 and row 2 col 2 on a 9-wide frame
        let detection = Detection::Found {
            start_index: 10,
            end_index: 20,
        };
        assert_eq!(mid_column(detection, 9), Some(1));
    }

    #[test]
    fn test_mid_column_truncates() {
        let detection = Detection::Found {
            start_index: 3,
            end_index: 6,
        };
        assert_eq!(mid_column(detection, 9), Some(4));
    }

    #[test]
    fn test_zero_stride_found_stops() {
        let thresholds = PolicyThresholds::default();
        assert_eq!(mid_column(found_at(0), 0), None);
        assert_eq!(decide(found_at(0), 0, &thresholds), Command::STOP);
    }

    #[test]
    fn test_classify_narrow_frames() {
        // window 0: column 0 is centered, anything else is right
        assert_eq!(classify(0, 2), Zone::Center);
        assert_eq!(classify(1, 2), Zone::Right);
        assert_eq!(classify(0, 1), Zone::Center);
    }

    #[test]
    fn test_classify_stride_ten() {
        // window 3, center covers 3..=6
        assert_eq!(classify(2, 10), Zone::Left);
        assert_eq!(classify(3, 10), Zone::Center);
        assert_eq!(classify(6, 10), Zone::Center);
        assert_eq!(classify(7, 10), Zone::Right);
        assert_eq!(classify(9, 10), Zone::Right);
    }

    #[test]
    fn test_custom_speeds() {
        let thresholds = PolicyThresholds {
            brightness_threshold: 200,
            linear_speed: 1.5,
            angular_speed: 0.25,
        };
        assert_eq!(decide(found_at(0), 9, &thresholds), Command::new(0.0, 0.25));
        assert_eq!(decide(found_at(4), 9, &thresholds), Command::new(1.5, 0.0));
        assert_eq!(decide(found_at(8), 9, &thresholds), Command::new(0.0, -0.25));
    }

    #[test]
    fn test_decide_is_idempotent() {
        let thresholds = PolicyThresholds::default();
        let detection = found_at(5);
        assert_eq!(
            decide(detection, 9, &thresholds),
            decide(detection, 9, &thresholds)
        );
    }

    #[test]
    fn test_zone_display() {
        assert_eq!(Zone::Left.to_string(), "left");
        assert_eq!(Zone::Right.to_string(), "right");
    }
}
