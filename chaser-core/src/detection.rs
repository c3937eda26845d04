//! Result of scanning one frame for target pixels

use serde::{Deserialize, Serialize};

/// Outcome of a locator scan.
///
/// `Found` carries linear indices into the frame buffer; `start_index` is
/// always `<= end_index` and both lie inside `0..height * stride`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Detection {
    Found { start_index: usize, end_index: usize },
    #[default]
    NotFound,
}

impl Detection {
    pub fn is_found(&self) -> bool {
        matches!(self, Detection::Found { .. })
    }

    /// `(start_index, end_index)` when found
    pub fn span(&self) -> Option<(usize, usize)> {
        match *self {
            Detection::Found {
                start_index,
                end_index,
            } => Some((start_index, end_index)),
            Detection::NotFound => None,
        }
    }
}
