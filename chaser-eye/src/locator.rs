//! Target locator: finds the bright target in a raw frame buffer

use chaser_core::{Detection, Frame, LocatorConfig, PixelMatch};

/// Scan `frame` for target pixels using exact intensity matching.
///
/// Shorthand for the default [`Locator`]; this is the deployed behavior.
pub fn locate(frame: &Frame, brightness_threshold: u8) -> Detection {
    Locator::default().locate(frame, brightness_threshold)
}

/// Single-pass scanner over a frame's pixel buffer.
///
/// The scan walks linear indices in increasing order. The first matching
/// pixel fixes `start_index`; every later match overwrites `end_index`, so a
/// frame yields `Found` only once two or more pixels matched. On multi-channel
/// frames each channel byte is a candidate on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Locator {
    matching: PixelMatch,
}

impl Locator {
    pub fn new(config: LocatorConfig) -> Self {
        Self {
            matching: config.matching,
        }
    }

    pub fn with_matching(matching: PixelMatch) -> Self {
        Self { matching }
    }

    pub fn matching(&self) -> PixelMatch {
        self.matching
    }

    /// True when configured exactly as the deployed controller
    pub fn is_legacy(&self) -> bool {
        self.matching == PixelMatch::Exact
    }

    /// Scan one frame. Degenerate or malformed frames give `NotFound`.
    pub fn locate(&self, frame: &Frame, brightness_threshold: u8) -> Detection {
        if !frame.is_well_formed() {
            return Detection::NotFound;
        }

        let mut start_index = None;
        let mut end_index = None;

        for (index, &intensity) in frame.pixels().iter().enumerate() {
            if !self.is_target(intensity, brightness_threshold) {
                continue;
            }
            if start_index.is_none() {
                start_index = Some(index);
            } else {
                end_index = Some(index);
            }
        }

        match (start_index, end_index) {
            (Some(start_index), Some(end_index)) => Detection::Found {
                start_index,
                end_index,
            },
            _ => Detection::NotFound,
        }
    }

    #[inline]
    fn is_target(&self, intensity: u8, threshold: u8) -> bool {
        match self.matching {
            PixelMatch::Exact => intensity == threshold,
            PixelMatch::AtLeast => intensity >= threshold,
        }
    }
}
