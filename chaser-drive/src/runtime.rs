//! Async runtime adapter: feeds frames from a source through a handler
//!
//! Frames are handled one at a time by a single consumer task. Frames that
//! arrive while the consumer is busy wait in a bounded channel; once it is
//! full the newest frame is dropped.

use crate::handler::FrameHandler;
use async_trait::async_trait;
use chaser_core::Frame;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Produces frames for the controller
#[async_trait]
pub trait FrameSource: Send {
    /// Next frame, or `None` once the source is exhausted
    async fn next_frame(&mut self) -> Option<Frame>;
}

/// Receiving half of a bounded frame channel
#[derive(Debug)]
pub struct ChannelFrameSource {
    receiver: mpsc::Receiver<Frame>,
}

#[async_trait]
impl FrameSource for ChannelFrameSource {
    async fn next_frame(&mut self) -> Option<Frame> {
        self.receiver.recv().await
    }
}

/// Sending half of a bounded frame channel
#[derive(Debug, Clone)]
pub struct ChannelFrameSender {
    sender: mpsc::Sender<Frame>,
}

impl ChannelFrameSender {
    /// Queue a frame without waiting.
    ///
    /// Returns `false` if the frame was dropped because the queue is full
    /// or the consumer has gone away.
    pub fn offer(&self, frame: Frame) -> bool {
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Frame queue full, dropping newest frame");
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Frame consumer closed, dropping frame");
                false
            }
        }
    }

    /// Queue a frame, waiting for room. Returns `false` if the consumer is gone.
    pub async fn send(&self, frame: Frame) -> bool {
        self.sender.send(frame).await.is_ok()
    }

    /// True once the consuming source has been dropped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Resolves when the consuming source has been dropped
    pub async fn closed(&self) {
        self.sender.closed().await
    }
}

/// Bounded frame channel of `depth` slots (at least one)
pub fn frame_channel(depth: usize) -> (ChannelFrameSender, ChannelFrameSource) {
    let (sender, receiver) = mpsc::channel(depth.max(1));
    (
        ChannelFrameSender { sender },
        ChannelFrameSource { receiver },
    )
}

enum Event {
    Shutdown,
    SignalLost,
    Frame(Option<Frame>),
}

/// Single-consumer loop driving a [`FrameHandler`]
pub struct FrameLoop {
    handler: Arc<FrameHandler>,
    shutdown: Option<watch::Receiver<bool>>,
}

impl FrameLoop {
    pub fn new(handler: Arc<FrameHandler>) -> Self {
        Self {
            handler,
            shutdown: None,
        }
    }

    /// Stop once `shutdown` carries `true`
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn handler(&self) -> &Arc<FrameHandler> {
        &self.handler
    }

    /// Handle frames in delivery order until the source ends or shutdown is
    /// signaled. Returns the number of frames handled.
    pub async fn run<S>(mut self, source: &mut S) -> usize
    where
        S: FrameSource + ?Sized,
    {
        let mut handled = 0usize;

        loop {
            let event = match self.shutdown.as_mut() {
                Some(shutdown) => {
                    if *shutdown.borrow() {
                        Event::Shutdown
                    } else {
                        tokio::select! {
                            biased;
                            changed = shutdown.changed() => match changed {
                                Ok(()) if *shutdown.borrow() => Event::Shutdown,
                                Ok(()) => continue,
                                Err(_) => Event::SignalLost,
                            },
                            frame = source.next_frame() => Event::Frame(frame),
                        }
                    }
                }
                None => Event::Frame(source.next_frame().await),
            };

            match event {
                Event::Shutdown => {
                    info!("Shutdown requested after {} frames", handled);
                    break;
                }
                Event::SignalLost => {
                    debug!("Shutdown sender dropped, running until the source ends");
                    self.shutdown = None;
                }
                Event::Frame(Some(frame)) => {
                    self.handler.handle(&frame);
                    handled += 1;
                }
                Event::Frame(None) => {
                    info!("Frame source exhausted after {} frames", handled);
                    break;
                }
            }
        }

        handled
    }

    /// Run on a tokio task
    pub fn spawn<S>(self, mut source: S) -> JoinHandle<usize>
    where
        S: FrameSource + 'static,
    {
        tokio::spawn(async move { self.run(&mut source).await })
    }
}
