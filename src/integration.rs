//! Integration module for connecting a tracking session to the outside
//! world: frame producers, tap selection and overlay rendering.

mod frame_source;
mod overlay;
mod pipeline;
mod selection;

pub use frame_source::{FrameSource, IterFrameSource};
pub use overlay::{LayerGeometry, LayerRect, OverlayRenderer, OverlayUpdate};
pub use pipeline::{
    DEFAULT_CONFIDENCE_THRESHOLD, PipelineConfig, PipelineError, PipelineHandle, PipelineStats,
    SelectionHandle, TrackerPipeline,
};
pub use selection::{DEFAULT_SELECTION_SIZE, SelectionBuilder};
