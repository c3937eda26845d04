//! Frame handler: locate, decide and dispatch for each delivered frame

use crate::policy::{classify, decide, mid_column};
use crate::sink::CommandSink;
use chaser_core::{ChaserConfig, Command, ConfigError, DispatchError, Frame, PolicyThresholds};
use chaser_eye::Locator;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Whether a frame is currently being processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerState {
    Idle,
    Processing,
}

/// Counters since the handler was built. Never read by the decision path.
#[derive(Debug, Default)]
struct HandlerStats {
    frames: AtomicU64,
    targets_found: AtomicU64,
    stops: AtomicU64,
    dispatch_failures: AtomicU64,
}

/// Point-in-time copy of the handler counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HandlerStatsSnapshot {
    pub frames: u64,
    pub targets_found: u64,
    pub stops: u64,
    pub dispatch_failures: u64,
}

/// Marks the handler as processing until dropped, including on unwind
struct ProcessingGuard<'a> {
    in_flight: &'a AtomicUsize,
}

impl<'a> ProcessingGuard<'a> {
    fn enter(in_flight: &'a AtomicUsize) -> Self {
        in_flight.fetch_add(1, Ordering::AcqRel);
        Self { in_flight }
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Memoryless per-frame controller.
///
/// Each call runs scan, decision and dispatch to completion. Nothing learned
/// from one frame affects the next, so the handler can be shared across
/// threads and called re-entrantly.
pub struct FrameHandler {
    sink: Arc<dyn CommandSink>,
    thresholds: PolicyThresholds,
    locator: Locator,
    in_flight: AtomicUsize,
    stats: HandlerStats,
}

impl FrameHandler {
    /// Create a handler dispatching to `sink`
    pub fn new(sink: Arc<dyn CommandSink>, thresholds: PolicyThresholds, locator: Locator) -> Self {
        if !locator.is_legacy() {
            warn!(
                "Locator uses {:?} pixel matching instead of exact matching; detections differ from the deployed controller",
                locator.matching()
            );
        }

        Self {
            sink,
            thresholds,
            locator,
            in_flight: AtomicUsize::new(0),
            stats: HandlerStats::default(),
        }
    }

    /// Validate `config` and build a handler from it
    pub fn from_config(config: &ChaserConfig, sink: Arc<dyn CommandSink>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(sink, config.thresholds, Locator::new(config.locator)))
    }

    /// Process one frame; dispatch failures are reported and absorbed
    pub fn handle(&self, frame: &Frame) {
        if let Err(e) = self.process(frame) {
            error!("Failed to send command to {}: {}", self.sink.name(), e);
        }
    }

    /// Process one frame and return the dispatched command
    pub fn process(&self, frame: &Frame) -> Result<Command, DispatchError> {
        let _guard = ProcessingGuard::enter(&self.in_flight);
        self.stats.frames.fetch_add(1, Ordering::Relaxed);

        let detection = self
            .locator
            .locate(frame, self.thresholds.brightness_threshold);
        let command = decide(detection, frame.stride(), &self.thresholds);

        match mid_column(detection, frame.stride()) {
            Some(mid) => {
                self.stats.targets_found.fetch_add(1, Ordering::Relaxed);
                debug!(
                    "Target at column {} ({}), sending {}",
                    mid,
                    classify(mid, frame.stride()),
                    command
                );
            }
            None => {
                self.stats.stops.fetch_add(1, Ordering::Relaxed);
                debug!("No target in {}x{} frame, stopping", frame.height(), frame.stride());
            }
        }

        if let Err(e) = self.sink.dispatch(&command) {
            self.stats.dispatch_failures.fetch_add(1, Ordering::Relaxed);
            return Err(e);
        }

        Ok(command)
    }

    pub fn state(&self) -> HandlerState {
        if self.in_flight.load(Ordering::Acquire) == 0 {
            HandlerState::Idle
        } else {
            HandlerState::Processing
        }
    }

    pub fn stats(&self) -> HandlerStatsSnapshot {
        HandlerStatsSnapshot {
            frames: self.stats.frames.load(Ordering::Relaxed),
            targets_found: self.stats.targets_found.load(Ordering::Relaxed),
            stops: self.stats.stops.load(Ordering::Relaxed),
            dispatch_failures: self.stats.dispatch_failures.load(Ordering::Relaxed),
        }
    }

    pub fn thresholds(&self) -> &PolicyThresholds {
        &self.thresholds
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }
}
