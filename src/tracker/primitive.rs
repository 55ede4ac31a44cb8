//! The tracking capability a session delegates to.

use crate::tracker::error::TrackError;
use crate::tracker::frame::Frame;
use crate::tracker::observation::Observation;

/// Speed/accuracy trade-off for the bundled trackers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingLevel {
    /// Coarser search and fewer iterations
    Fast,
    /// Dense search and more iterations
    #[default]
    Accurate,
}

/// Trait for single-object tracking backends.
///
/// Implement this trait to plug any tracker (correlation filter, optical
/// flow, a hardware tracker) into a [`TrackingSession`](crate::TrackingSession).
/// Given the previous observation and the current frame, produce the new
/// observation or report that the object could not be located.
///
/// Closures with the matching signature implement the trait, which keeps
/// test doubles short:
///
/// ```
/// use objtrack_rs::{Frame, NormalizedRect, Observation, TrackError, TrackingSession};
///
/// let session = TrackingSession::with_default_config(
///     |prev: &Observation, _frame: &Frame| -> Result<Observation, TrackError> {
///         Ok(Observation::new(prev.rect.translated(0.01, 0.0), 0.9))
///     },
/// );
/// session.select_target(NormalizedRect::new(0.4, 0.4, 0.2, 0.2));
/// ```
pub trait TrackingPrimitive: Send {
    /// Locate the object described by `previous` in `frame`.
    fn track(&mut self, previous: &Observation, frame: &Frame) -> Result<Observation, TrackError>;

    /// Forget everything learned about the previous target.
    ///
    /// Called by the session before the first `track` of every new
    /// selection. Stateless trackers keep the default no-op.
    fn reset(&mut self) {}
}

impl<F> TrackingPrimitive for F
where
    F: FnMut(&Observation, &Frame) -> Result<Observation, TrackError> + Send,
{
    fn track(&mut self, previous: &Observation, frame: &Frame) -> Result<Observation, TrackError> {
        self(previous, frame)
    }
}
