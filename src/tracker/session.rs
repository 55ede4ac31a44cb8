//! Tracking session: the single current observation of a user-selected target.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::tracker::error::TrackError;
use crate::tracker::frame::Frame;
use crate::tracker::observation::Observation;
use crate::tracker::primitive::TrackingPrimitive;
use crate::tracker::rect::NormalizedRect;
use crate::tracker::track_state::SessionState;

/// What the session does with its observation when the tracker fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Drop the observation and return to idle; a new selection is needed.
    #[default]
    ClearTarget,
    /// Keep the last observation and retry from it on the next frame.
    KeepLast,
}

/// Configuration for a [`TrackingSession`].
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub failure_policy: FailurePolicy,
}

/// The guarded state: one observation plus the selection generation it
/// belongs to. Always written as a whole.
#[derive(Debug, Default)]
struct SessionCell {
    observation: Option<Observation>,
    generation: u64,
    /// Generation the tracker last committed a result for.
    tracked_generation: Option<u64>,
}

/// Follows one selected object from frame to frame.
///
/// Each update depends only on the previous observation and the current
/// frame; no history is kept, no smoothing is applied and a lost target is
/// never re-detected. Low confidence does not end tracking: the session
/// keeps propagating the observation and leaves hiding it to the caller.
///
/// The session is `Sync`. `select_target` may be called from a UI thread
/// while a frame thread runs `update`; the observation is guarded by a
/// single mutex so readers always see a whole record. The tracking
/// primitive sits behind its own mutex, which keeps at most one tracking
/// computation in flight without ever blocking a selection.
pub struct TrackingSession<T: TrackingPrimitive> {
    cell: Mutex<SessionCell>,
    tracker: Mutex<T>,
    config: SessionConfig,
}

impl<T: TrackingPrimitive> TrackingSession<T> {
    pub fn new(tracker: T, config: SessionConfig) -> Self {
        Self {
            cell: Mutex::new(SessionCell::default()),
            tracker: Mutex::new(tracker),
            config,
        }
    }

    pub fn with_default_config(tracker: T) -> Self {
        Self::new(tracker, SessionConfig::default())
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Start tracking `rect` (clamped to the unit square) at full confidence.
    ///
    /// Replaces whatever was being tracked. An update that is in flight
    /// when this is called will not overwrite the new selection.
    pub fn select_target(&self, rect: NormalizedRect) {
        let observation = Observation::selected(rect.clamped());
        let mut cell = lock(&self.cell);
        cell.observation = Some(observation);
        cell.generation = cell.generation.wrapping_add(1);
        log::info!(
            "target selected at ({:.3}, {:.3}) size {:.3}x{:.3}",
            observation.rect.x,
            observation.rect.y,
            observation.rect.width,
            observation.rect.height
        );
    }

    /// Stop tracking and return to idle.
    pub fn clear(&self) {
        let mut cell = lock(&self.cell);
        if cell.observation.take().is_some() {
            cell.generation = cell.generation.wrapping_add(1);
            log::info!("target cleared");
        }
    }

    /// Snapshot of the current observation, if any.
    pub fn current_observation(&self) -> Option<Observation> {
        lock(&self.cell).observation
    }

    pub fn state(&self) -> SessionState {
        match lock(&self.cell).observation {
            Some(_) => SessionState::Tracking,
            None => SessionState::Idle,
        }
    }

    /// Advance the tracked target to `frame`.
    ///
    /// Returns `None` when idle (the tracker is not invoked) or when the
    /// tracker fails; see [`TrackingSession::try_update`] for the error.
    pub fn update(&self, frame: &Frame) -> Option<Observation> {
        self.try_update(frame).ok().flatten()
    }

    /// Like [`TrackingSession::update`], but surfaces the tracker error.
    ///
    /// The state transition is the same: on error the configured
    /// [`FailurePolicy`] is applied before the error is returned.
    pub fn try_update(&self, frame: &Frame) -> Result<Option<Observation>, TrackError> {
        let mut tracker = lock(&self.tracker);

        let (previous, generation, fresh) = {
            let cell = lock(&self.cell);
            match cell.observation {
                Some(observation) => (
                    observation,
                    cell.generation,
                    cell.tracked_generation != Some(cell.generation),
                ),
                None => return Ok(None),
            }
        };

        if fresh {
            log::debug!("frame {}: new selection, resetting tracker", frame.index());
            tracker.reset();
        }
        let result = tracker.track(&previous, frame);

        let mut cell = lock(&self.cell);
        if cell.generation != generation {
            log::debug!(
                "frame {}: selection changed during tracking, result discarded",
                frame.index()
            );
            return Ok(cell.observation);
        }
        cell.tracked_generation = Some(generation);

        match result {
            Ok(observation) => {
                log::debug!(
                    "frame {}: target at ({:.3}, {:.3}) confidence {:.3}",
                    frame.index(),
                    observation.rect.x,
                    observation.rect.y,
                    observation.confidence
                );
                cell.observation = Some(observation);
                Ok(Some(observation))
            }
            Err(err) => {
                match self.config.failure_policy {
                    FailurePolicy::ClearTarget => {
                        log::warn!("frame {}: {err}; clearing target", frame.index());
                        cell.observation = None;
                        cell.generation = cell.generation.wrapping_add(1);
                    }
                    FailurePolicy::KeepLast => {
                        log::warn!("frame {}: {err}; keeping last observation", frame.index());
                    }
                }
                Err(err)
            }
        }
    }
}

/// Every write to the guarded values is a whole-value assignment, so a
/// poisoned lock still holds a consistent value.
fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
