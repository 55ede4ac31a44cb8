mod correlation;
mod error;
mod frame;
mod observation;
mod optical_flow;
mod primitive;
mod rect;
mod session;
mod track_state;

pub use correlation::{CorrelationConfig, CorrelationTracker};
pub use error::{FrameError, TrackError};
pub use frame::{Frame, PixelFormat};
pub use observation::Observation;
pub use optical_flow::{FlowConfig, FlowTracker};
pub use primitive::{TrackingLevel, TrackingPrimitive};
pub use rect::{CoordinateOrigin, NormalizedRect};
pub use session::{FailurePolicy, SessionConfig, TrackingSession};
pub use track_state::SessionState;
