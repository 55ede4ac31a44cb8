//! TrackerPipeline for running a tracking session against a frame source.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use thiserror::Error;

use crate::tracker::{
    Frame, NormalizedRect, Observation, SessionConfig, TrackingPrimitive, TrackingSession,
};

use super::overlay::{OverlayRenderer, OverlayUpdate};
use super::FrameSource;

/// Default visibility threshold for observations.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.45;

/// Configuration for the [`TrackerPipeline`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Observations at or above this confidence are shown.
    pub confidence_threshold: f32,
    pub session: SessionConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            session: SessionConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("frame worker panicked")]
    WorkerPanicked,
}

/// Counters collected by the frame worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub frames_processed: u64,
    /// Frames for which the session produced an observation
    pub frames_tracked: u64,
    /// Frames whose observation passed the confidence threshold
    pub frames_visible: u64,
    pub source_errors: u64,
}

/// Connects a [`TrackingSession`] to a frame producer and a renderer.
///
/// Frames are processed serially, either by calling
/// [`TrackerPipeline::process_frame`] from the capture callback or by
/// handing a [`FrameSource`] to [`TrackerPipeline::spawn`]. Each processed
/// frame publishes one [`OverlayUpdate`] into a single-slot channel that the
/// UI thread drains with [`TrackerPipeline::drain_overlay`]. A newer update
/// replaces one the UI has not picked up yet, so publishing never blocks the
/// frame thread and nothing piles up when nobody drains. Taps arrive through
/// [`SelectionHandle`]s from any thread.
pub struct TrackerPipeline<T: TrackingPrimitive> {
    session: Arc<TrackingSession<T>>,
    confidence_threshold: f32,
    overlay_tx: Sender<OverlayUpdate>,
    overlay_rx: Receiver<OverlayUpdate>,
}

impl<T: TrackingPrimitive> Clone for TrackerPipeline<T> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            confidence_threshold: self.confidence_threshold,
            overlay_tx: self.overlay_tx.clone(),
            overlay_rx: self.overlay_rx.clone(),
        }
    }
}

impl<T: TrackingPrimitive> TrackerPipeline<T> {
    /// Create a new pipeline around the given tracking primitive.
    pub fn new(tracker: T, config: PipelineConfig) -> Self {
        let (overlay_tx, overlay_rx) = crossbeam_channel::bounded(1);
        Self {
            session: Arc::new(TrackingSession::new(tracker, config.session)),
            confidence_threshold: config.confidence_threshold,
            overlay_tx,
            overlay_rx,
        }
    }

    /// Create a new pipeline with default configuration.
    pub fn with_default_config(tracker: T) -> Self {
        Self::new(tracker, PipelineConfig::default())
    }

    pub fn session(&self) -> &TrackingSession<T> {
        &self.session
    }

    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    /// A handle the UI thread uses to select targets.
    pub fn selection(&self) -> SelectionHandle<T> {
        SelectionHandle {
            session: Arc::clone(&self.session),
        }
    }

    /// Track one frame, emit the resulting overlay update and return it.
    ///
    /// Must be called serially from the frame-producing thread.
    pub fn process_frame(&self, frame: &Frame) -> OverlayUpdate {
        self.track_frame(frame).1
    }

    fn track_frame(&self, frame: &Frame) -> (Option<Observation>, OverlayUpdate) {
        let observation = self.session.update(frame);
        let update = OverlayUpdate::from_observation(
            observation.as_ref(),
            self.confidence_threshold,
            frame.index(),
        );
        self.publish(update);
        (observation, update)
    }

    /// Replace the pending overlay update with `update`.
    fn publish(&self, update: OverlayUpdate) {
        // The pipeline holds a receiver, so the channel is never disconnected.
        if let Err(TrySendError::Full(update)) = self.overlay_tx.try_send(update) {
            let _ = self.overlay_rx.try_recv();
            // Another frame thread may refill the slot first; its update is as fresh.
            let _ = self.overlay_tx.try_send(update);
        }
    }

    /// Receiving end of the overlay channel, for event-loop integration.
    pub fn overlay_updates(&self) -> &Receiver<OverlayUpdate> {
        &self.overlay_rx
    }

    /// Render the pending overlay update, if any. Call from the UI thread.
    ///
    /// Returns the number of updates rendered (zero or one).
    pub fn drain_overlay<R: OverlayRenderer + ?Sized>(&self, renderer: &mut R) -> usize {
        let mut rendered = 0;
        for update in self.overlay_rx.try_iter() {
            renderer.render(update);
            rendered += 1;
        }
        rendered
    }
}

impl<T: TrackingPrimitive + 'static> TrackerPipeline<T> {
    /// Run `source` on a dedicated frame worker until it is exhausted or the
    /// returned handle is stopped.
    ///
    /// Source errors drop the affected frame and are counted.
    pub fn spawn<S>(&self, mut source: S) -> PipelineHandle
    where
        S: FrameSource + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = Arc::clone(&stop);
        let pipeline = self.clone();

        let handle = std::thread::spawn(move || {
            let mut stats = PipelineStats::default();
            while !worker_stop.load(Ordering::Relaxed) {
                let frame = match source.next_frame() {
                    Some(Ok(frame)) => frame,
                    Some(Err(e)) => {
                        log::warn!("frame source error, frame dropped: {e}");
                        stats.source_errors += 1;
                        continue;
                    }
                    None => break,
                };
                let (observation, update) = pipeline.track_frame(&frame);
                stats.frames_processed += 1;
                if observation.is_some() {
                    stats.frames_tracked += 1;
                }
                if update.visible {
                    stats.frames_visible += 1;
                }
            }
            log::info!(
                "frame worker finished: {} processed, {} tracked, {} visible",
                stats.frames_processed,
                stats.frames_tracked,
                stats.frames_visible
            );
            stats
        });

        PipelineHandle { stop, handle }
    }
}

/// Cloneable handle for selecting targets from the UI thread.
pub struct SelectionHandle<T: TrackingPrimitive> {
    session: Arc<TrackingSession<T>>,
}

impl<T: TrackingPrimitive> Clone for SelectionHandle<T> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
        }
    }
}

impl<T: TrackingPrimitive> SelectionHandle<T> {
    /// Select a new target; takes effect from the next processed frame.
    pub fn select_target(&self, rect: NormalizedRect) {
        self.session.select_target(rect);
    }

    /// Stop tracking.
    pub fn clear(&self) {
        self.session.clear();
    }
}

/// Handle to a running frame worker.
pub struct PipelineHandle {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<PipelineStats>,
}

impl PipelineHandle {
    /// Ask the worker to stop after the frame it is processing.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the worker to exit and collect its counters.
    pub fn join(self) -> Result<PipelineStats, PipelineError> {
        self.handle.join().map_err(|_| PipelineError::WorkerPanicked)
    }
}
