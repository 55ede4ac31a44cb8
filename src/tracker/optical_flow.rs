//! Translational Lucas-Kanade optical flow tracker.

use nalgebra::{Matrix2, Vector2};
use ndarray::Array2;

use crate::tracker::error::TrackError;
use crate::tracker::frame::Frame;
use crate::tracker::observation::Observation;
use crate::tracker::primitive::{TrackingLevel, TrackingPrimitive};

/// Configuration for the [`FlowTracker`].
#[derive(Debug, Clone)]
pub struct FlowConfig {
    pub max_iterations: usize,
    /// Stop iterating once a step moves less than this many pixels.
    pub convergence: f32,
    /// Minimum eigenvalue of the per-sample structure tensor; below it the
    /// window has too little texture to track.
    pub min_eigenvalue: f32,
    /// Mean absolute residual (in luma units) that maps to zero confidence.
    pub residual_scale: f32,
    /// Cap on gradient samples per side; larger targets are subsampled.
    pub max_samples_per_side: usize,
}

impl FlowConfig {
    pub fn for_level(level: TrackingLevel) -> Self {
        match level {
            TrackingLevel::Accurate => Self::default(),
            TrackingLevel::Fast => Self {
                max_iterations: 5,
                max_samples_per_side: 16,
                ..Self::default()
            },
        }
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            convergence: 0.01,
            min_eigenvalue: 1.0,
            residual_scale: 32.0,
            max_samples_per_side: 32,
        }
    }
}

/// Gradient sample from the previous frame.
#[derive(Debug, Clone, Copy)]
struct Sample {
    x: f32,
    y: f32,
    value: f32,
    gradient: Vector2<f32>,
}

/// Estimates how the target window moved between the previous frame and the
/// current one by iterative Lucas-Kanade on a single translation.
///
/// The first frame after a reset (or a frame of different size) only becomes
/// the reference and the previous observation is returned unchanged.
#[derive(Debug, Clone, Default)]
pub struct FlowTracker {
    config: FlowConfig,
    previous_luma: Option<Array2<f32>>,
}

impl FlowTracker {
    pub fn new(config: FlowConfig) -> Self {
        Self {
            config,
            previous_luma: None,
        }
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    fn estimate(
        &self,
        prev: &Array2<f32>,
        curr: &Array2<f32>,
        previous: &Observation,
    ) -> Result<Observation, TrackError> {
        let (rows, cols) = curr.dim();
        let (x0, y0, tw, th) = previous
            .rect
            .pixel_window(cols, rows)
            .ok_or(TrackError::DegenerateTarget)?;

        let samples = gradient_samples(prev, (x0, y0, tw, th), self.config.max_samples_per_side);
        if samples.is_empty() {
            return Err(TrackError::DegenerateTarget);
        }

        let n = samples.len() as f32;
        let structure = samples
            .iter()
            .fold(Matrix2::zeros(), |acc: Matrix2<f32>, s| {
                acc + s.gradient * s.gradient.transpose()
            })
            / n;
        let min_eigenvalue = smallest_eigenvalue(&structure);
        if min_eigenvalue < self.config.min_eigenvalue {
            return Err(TrackError::lost(format!(
                "window lacks texture (eigenvalue {min_eigenvalue:.3})"
            )));
        }
        let inverse = structure
            .try_inverse()
            .ok_or_else(|| TrackError::lost("structure tensor is singular"))?;

        let mut shift = Vector2::<f32>::zeros();
        for _ in 0..self.config.max_iterations {
            let mut mismatch = Vector2::<f32>::zeros();
            let mut count = 0usize;
            for s in &samples {
                if let Some(v) = bilinear(curr, s.x + shift.x, s.y + shift.y) {
                    mismatch += s.gradient * (v - s.value);
                    count += 1;
                }
            }
            if count == 0 {
                return Err(TrackError::lost("target window left the frame"));
            }
            let step = -(inverse * (mismatch / count as f32));
            shift += step;
            if step.norm() < self.config.convergence {
                break;
            }
        }

        let residuals: Vec<f32> = samples
            .iter()
            .filter_map(|s| {
                bilinear(curr, s.x + shift.x, s.y + shift.y).map(|v| (v - s.value).abs())
            })
            .collect();
        if residuals.is_empty() {
            return Err(TrackError::lost("target window left the frame"));
        }
        let mean_residual = residuals.iter().sum::<f32>() / residuals.len() as f32;

        let rect = previous
            .rect
            .translated(shift.x / cols as f32, shift.y / rows as f32);
        if !rect.intersects_unit() {
            return Err(TrackError::lost("target moved out of frame"));
        }
        let confidence = 1.0 - mean_residual / self.config.residual_scale;
        Ok(Observation::new(rect, confidence))
    }
}

impl TrackingPrimitive for FlowTracker {
    fn track(&mut self, previous: &Observation, frame: &Frame) -> Result<Observation, TrackError> {
        let curr = frame.luma();
        let result = match &self.previous_luma {
            Some(prev) if prev.dim() == curr.dim() => self.estimate(prev, &curr, previous),
            _ => Ok(*previous),
        };
        self.previous_luma = Some(curr);
        result
    }

    fn reset(&mut self) {
        self.previous_luma = None;
    }
}

/// Central-difference gradients over the window, skipping the image border.
fn gradient_samples(
    luma: &Array2<f32>,
    (x0, y0, tw, th): (usize, usize, usize, usize),
    max_per_side: usize,
) -> Vec<Sample> {
    let (rows, cols) = luma.dim();
    let stride = tw.max(th).div_ceil(max_per_side.max(1)).max(1);
    let xs = x0.max(1)..(x0 + tw).min(cols - 1);
    let ys = y0.max(1)..(y0 + th).min(rows - 1);

    let mut samples = Vec::new();
    for y in ys.step_by(stride) {
        for x in xs.clone().step_by(stride) {
            let gx = (luma[[y, x + 1]] - luma[[y, x - 1]]) / 2.0;
            let gy = (luma[[y + 1, x]] - luma[[y - 1, x]]) / 2.0;
            samples.push(Sample {
                x: x as f32,
                y: y as f32,
                value: luma[[y, x]],
                gradient: Vector2::new(gx, gy),
            });
        }
    }
    samples
}

/// Bilinear lookup at a sub-pixel position; `None` outside the image.
fn bilinear(luma: &Array2<f32>, x: f32, y: f32) -> Option<f32> {
    let (rows, cols) = luma.dim();
    if !(x >= 0.0 && y >= 0.0 && x <= (cols - 1) as f32 && y <= (rows - 1) as f32) {
        return None;
    }
    let (xf, yf) = (x.floor() as usize, y.floor() as usize);
    let (xc, yc) = ((xf + 1).min(cols - 1), (yf + 1).min(rows - 1));
    let (ax, ay) = (x - xf as f32, y - yf as f32);
    let top = luma[[yf, xf]] * (1.0 - ax) + luma[[yf, xc]] * ax;
    let bottom = luma[[yc, xf]] * (1.0 - ax) + luma[[yc, xc]] * ax;
    Some(top * (1.0 - ay) + bottom * ay)
}

/// Smaller eigenvalue of a symmetric 2x2 matrix.
fn smallest_eigenvalue(m: &Matrix2<f32>) -> f32 {
    let trace = m.trace();
    let det = m.determinant();
    let disc = (trace * trace / 4.0 - det).max(0.0).sqrt();
    trace / 2.0 - disc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::rect::NormalizedRect;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    fn blob_frame(cx: f32, cy: f32, index: u64) -> Frame {
        let plane = Array2::from_shape_fn((64, 64), |(y, x)| {
            let d2 = (x as f32 - cx).powi(2) + (y as f32 - cy).powi(2);
            20.0 + 200.0 * (-d2 / 50.0).exp()
        });
        Frame::from_luma(&plane, index).unwrap()
    }

    fn around(cx: f32, cy: f32) -> Observation {
        Observation::selected(NormalizedRect::from_center(cx / 64.0, cy / 64.0, 0.3, 0.3))
    }

    #[test]
    fn test_bilinear_interpolates() {
        let luma = ndarray::array![[0.0f32, 10.0], [20.0, 30.0]];
        assert_abs_diff_eq!(bilinear(&luma, 0.5, 0.5).unwrap(), 15.0, epsilon = 1e-5);
        assert_abs_diff_eq!(bilinear(&luma, 1.0, 0.0).unwrap(), 10.0, epsilon = 1e-5);
        assert_eq!(bilinear(&luma, 1.5, 0.0), None);
        assert_eq!(bilinear(&luma, -0.1, 0.0), None);
    }

    #[test]
    fn test_smallest_eigenvalue() {
        let m = Matrix2::new(4.0f32, 0.0, 0.0, 1.0);
        assert_abs_diff_eq!(smallest_eigenvalue(&m), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_first_frame_becomes_reference() {
        let mut tracker = FlowTracker::default();
        let prev = around(32.0, 32.0);

        let obs = tracker.track(&prev, &blob_frame(32.0, 32.0, 0)).unwrap();

        assert_eq!(obs, prev);
        assert!(tracker.previous_luma.is_some());
    }

    #[rstest]
    #[case::right(1.0, 0.0)]
    #[case::down_left(-1.0, 1.5)]
    fn test_follows_small_motion(#[case] dx: f32, #[case] dy: f32) {
        let mut tracker = FlowTracker::default();
        let start = tracker.track(&around(32.0, 32.0), &blob_frame(32.0, 32.0, 0)).unwrap();

        let moved = tracker
            .track(&start, &blob_frame(32.0 + dx, 32.0 + dy, 1))
            .unwrap();

        assert_abs_diff_eq!((moved.rect.x - start.rect.x) * 64.0, dx, epsilon = 0.3);
        assert_abs_diff_eq!((moved.rect.y - start.rect.y) * 64.0, dy, epsilon = 0.3);
        assert!(moved.confidence > 0.45);
    }

    #[test]
    fn test_flat_window_is_lost() {
        let mut tracker = FlowTracker::default();
        let flat = Frame::from_luma(&Array2::from_elem((64, 64), 50.0), 0).unwrap();
        let prev = around(32.0, 32.0);
        tracker.track(&prev, &flat).unwrap();

        let err = tracker.track(&prev, &flat).unwrap_err();

        assert!(matches!(err, TrackError::TargetLost { .. }));
    }

    #[test]
    fn test_fast_level_uses_fewer_samples() {
        let fast = FlowConfig::for_level(TrackingLevel::Fast);
        let accurate = FlowConfig::for_level(TrackingLevel::Accurate);
        assert!(fast.max_iterations < accurate.max_iterations);
        assert!(fast.max_samples_per_side < accurate.max_samples_per_side);
    }

    #[test]
    fn test_reset_drops_reference_frame() {
        let mut tracker = FlowTracker::default();
        tracker.track(&around(20.0, 32.0), &blob_frame(20.0, 32.0, 0)).unwrap();
        tracker.reset();

        // Same window, different content: no stale reference to compare to
        let reselected = around(44.0, 32.0);
        let obs = tracker.track(&reselected, &blob_frame(44.0, 32.0, 1)).unwrap();

        assert_eq!(obs, reselected);
    }

    #[test]
    fn test_frame_size_change_resets_reference() {
        let mut tracker = FlowTracker::default();
        let prev = around(32.0, 32.0);
        tracker.track(&prev, &blob_frame(32.0, 32.0, 0)).unwrap();
        let small = Frame::from_luma(&Array2::from_elem((16, 16), 0.0), 1).unwrap();

        assert_eq!(tracker.track(&prev, &small).unwrap(), prev);
    }
}
