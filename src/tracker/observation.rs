use crate::tracker::rect::NormalizedRect;

/// A tracker's output for one frame: where the object is and how sure the
/// tracker is about it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Bounding box in tracker space
    pub rect: NormalizedRect,
    /// Confidence in `[0, 1]`
    pub confidence: f32,
}

impl Observation {
    /// Create an observation, clamping `confidence` into `[0, 1]`.
    /// A NaN confidence is treated as zero.
    pub fn new(rect: NormalizedRect, confidence: f32) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self { rect, confidence }
    }

    /// Observation for a freshly selected target (full confidence).
    pub fn selected(rect: NormalizedRect) -> Self {
        Self::new(rect, 1.0)
    }

    /// Whether this observation should be shown. The boundary is inclusive:
    /// `confidence == threshold` is visible.
    #[inline]
    pub fn is_visible(&self, threshold: f32) -> bool {
        self.confidence >= threshold
    }
}
