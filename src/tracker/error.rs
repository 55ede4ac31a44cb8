//! Error types for frames and tracking primitives.

use thiserror::Error;

/// A frame buffer that does not describe a valid image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame has zero width or height")]
    EmptyFrame,
    #[error("frame buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

/// Failure of a tracking primitive to produce an observation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackError {
    /// The object could not be located in the frame (lost or occluded).
    #[error("target lost: {reason}")]
    TargetLost { reason: String },
    /// The previous rect covers fewer than 2x2 pixels of the frame.
    #[error("target rect covers too few pixels to track")]
    DegenerateTarget,
    #[error(transparent)]
    Frame(#[from] FrameError),
}

impl TrackError {
    pub(crate) fn lost(reason: impl Into<String>) -> Self {
        Self::TargetLost {
            reason: reason.into(),
        }
    }
}
