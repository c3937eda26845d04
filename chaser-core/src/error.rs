//! Error types for chaser-core

use thiserror::Error;

/// Failure to hand a command to the motion actuator.
///
/// Recoverable per frame: the handler reports it and moves on to the next
/// delivery without retrying.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Command sink unavailable: {0}")]
    Unavailable(String),

    #[error("Command rejected: {0}")]
    Rejected(String),

    #[error("Command encoding error: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors raised while turning external images into frames
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Frame decode error: {0}")]
    Decode(String),

    #[error("Unsupported frame layout: {0}")]
    Layout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
