//! chaser-drive: motion policy, frame handling and command dispatch
//!
//! The [`FrameHandler`] ties the locator to the three-zone [`decide`]
//! policy and hands each resulting [`chaser_core::Command`] to a
//! [`CommandSink`]. The [`runtime`] module runs a handler over an async
//! [`FrameSource`].

pub mod handler;
pub mod policy;
pub mod runtime;
pub mod sink;

pub use handler::{FrameHandler, HandlerState, HandlerStatsSnapshot};
pub use policy::{classify, decide, mid_column, Zone};
pub use runtime::{frame_channel, ChannelFrameSender, ChannelFrameSource, FrameLoop, FrameSource};
pub use sink::{ChannelSink, CommandSink, JsonLinesSink, LogSink};
