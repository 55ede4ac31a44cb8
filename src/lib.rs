//! Single-object tracking sessions for live video.
//!
//! A [`TrackingSession`] holds the current best estimate of one
//! user-selected object and advances it frame by frame through a pluggable
//! [`TrackingPrimitive`]. The [`integration`] module connects a session to
//! a frame source, a tap-to-rectangle selection and an overlay renderer.

pub mod integration;
pub mod tracker;

pub use integration::{
    FrameSource, IterFrameSource, LayerGeometry, LayerRect, OverlayRenderer, OverlayUpdate,
    PipelineConfig, PipelineError, PipelineHandle, PipelineStats, SelectionBuilder,
    SelectionHandle, TrackerPipeline,
};
pub use tracker::{
    CoordinateOrigin, CorrelationConfig, CorrelationTracker, FailurePolicy, FlowConfig,
    FlowTracker, Frame, FrameError, NormalizedRect, Observation, PixelFormat, SessionConfig,
    SessionState, TrackError, TrackingLevel, TrackingPrimitive, TrackingSession,
};
