//! Command sinks: where velocity commands leave the controller

use chaser_core::{Command, DispatchError};
use parking_lot::Mutex;
use std::io::Write;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::info;

/// Forwards commands to the motion actuator.
///
/// A dispatch is a single synchronous call. Implementations must not block
/// waiting for an acknowledgement beyond that call, and callers never retry.
pub trait CommandSink: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Hand one command to the actuator
    fn dispatch(&self, command: &Command) -> Result<(), DispatchError>;
}

/// Logs every command and never fails
#[derive(Debug, Default)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }
}

impl CommandSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    fn dispatch(&self, command: &Command) -> Result<(), DispatchError> {
        info!("Moving the robot towards the ball: {}", command);
        Ok(())
    }
}

/// Pushes commands into a bounded tokio channel without waiting.
///
/// A full channel or a dropped receiver is reported as unavailable.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::Sender<Command>,
}

impl ChannelSink {
    pub fn new(sender: mpsc::Sender<Command>) -> Self {
        Self { sender }
    }

    /// Create a sink together with the receiving end of its channel
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Command>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self::new(sender), receiver)
    }
}

impl CommandSink for ChannelSink {
    fn name(&self) -> &str {
        "channel"
    }

    fn dispatch(&self, command: &Command) -> Result<(), DispatchError> {
        self.sender.try_send(*command).map_err(|e| match e {
            TrySendError::Full(_) => DispatchError::Unavailable("command queue full".to_string()),
            TrySendError::Closed(_) => {
                DispatchError::Unavailable("command receiver closed".to_string())
            }
        })
    }
}

/// Writes one JSON object per command, e.g. `{"linear_x":0.4,"angular_z":0.0}`
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> CommandSink for JsonLinesSink<W> {
    fn name(&self) -> &str {
        "json-lines"
    }

    fn dispatch(&self, command: &Command) -> Result<(), DispatchError> {
        let line = serde_json::to_string(command).map_err(|e| DispatchError::Encode(e.to_string()))?;
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }
}
