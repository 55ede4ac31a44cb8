//! Template-matching tracker using normalized cross-correlation.

use ndarray::{Array2, ArrayView2, Zip, s};

use crate::tracker::error::TrackError;
use crate::tracker::frame::Frame;
use crate::tracker::observation::Observation;
use crate::tracker::primitive::{TrackingLevel, TrackingPrimitive};
use crate::tracker::rect::NormalizedRect;

/// Configuration for the [`CorrelationTracker`].
#[derive(Debug, Clone)]
pub struct CorrelationConfig {
    pub level: TrackingLevel,
    /// Search radius around the previous position, as a fraction of the
    /// larger target side.
    pub search_margin: f32,
    /// Best correlation below which the target counts as lost.
    pub min_correlation: f32,
    /// Cap on template samples per side; larger targets are subsampled.
    pub max_samples_per_side: usize,
}

impl CorrelationConfig {
    pub fn for_level(level: TrackingLevel) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            level: TrackingLevel::Accurate,
            search_margin: 0.5,
            min_correlation: 0.2,
            max_samples_per_side: 32,
        }
    }
}

/// Appearance template cut from the last frame the tracker saw.
#[derive(Debug, Clone)]
struct Template {
    pixels: Array2<f32>,
    rect: NormalizedRect,
    frame_dim: (usize, usize),
}

/// Tracks a target by sliding its last appearance over a search window.
///
/// The first frame after a new selection only seeds the template and
/// returns the selection unchanged. Every later frame searches a window
/// around the previous position for the best normalized cross-correlation
/// and re-cuts the template there, so appearance drift follows the object.
#[derive(Debug, Clone, Default)]
pub struct CorrelationTracker {
    config: CorrelationConfig,
    template: Option<Template>,
}

impl CorrelationTracker {
    pub fn new(config: CorrelationConfig) -> Self {
        Self {
            config,
            template: None,
        }
    }

    pub fn config(&self) -> &CorrelationConfig {
        &self.config
    }

    fn seed(
        &mut self,
        luma: &Array2<f32>,
        previous: &Observation,
    ) -> Result<Observation, TrackError> {
        let (rows, cols) = luma.dim();
        let (x0, y0, tw, th) = previous
            .rect
            .pixel_window(cols, rows)
            .ok_or(TrackError::DegenerateTarget)?;
        self.template = Some(Template {
            pixels: luma.slice(s![y0..y0 + th, x0..x0 + tw]).to_owned(),
            rect: previous.rect,
            frame_dim: (rows, cols),
        });
        Ok(*previous)
    }
}

impl TrackingPrimitive for CorrelationTracker {
    fn track(&mut self, previous: &Observation, frame: &Frame) -> Result<Observation, TrackError> {
        let luma = frame.luma();
        let (rows, cols) = luma.dim();

        let template = match &self.template {
            Some(t) if t.rect == previous.rect && t.frame_dim == (rows, cols) => t,
            _ => return self.seed(&luma, previous),
        };

        let (x0, y0, tw, th) = previous
            .rect
            .pixel_window(cols, rows)
            .ok_or(TrackError::DegenerateTarget)?;
        let (th, tw) = (th.min(template.pixels.nrows()), tw.min(template.pixels.ncols()));

        let stride = tw.max(th).div_ceil(self.config.max_samples_per_side.max(1)).max(1);
        let step = match self.config.level {
            TrackingLevel::Accurate => 1,
            TrackingLevel::Fast => stride,
        };
        let margin = (tw.max(th) as f32 * self.config.search_margin).ceil() as isize;
        let sampled = template.pixels.slice(s![..th;stride, ..tw;stride]);

        let offsets = search_offsets(margin, step);
        let mut best: Option<(f32, usize, usize)> = None;
        for &dy in &offsets {
            for &dx in &offsets {
                let (x, y) = (x0 as isize + dx, y0 as isize + dy);
                if x < 0 || y < 0 || x as usize + tw > cols || y as usize + th > rows {
                    continue;
                }
                let (x, y) = (x as usize, y as usize);
                let patch = luma.slice(s![y..y + th;stride, x..x + tw;stride]);
                let score = normalized_cross_correlation(sampled, patch);
                if best.is_none_or(|(b, _, _)| score > b) {
                    best = Some((score, x, y));
                }
            }
        }

        let (score, x, y) = best.ok_or_else(|| TrackError::lost("search window outside frame"))?;
        if score < self.config.min_correlation {
            return Err(TrackError::lost(format!(
                "best correlation {score:.3} below {:.3}",
                self.config.min_correlation
            )));
        }

        let rect = NormalizedRect::new(
            x as f32 / cols as f32,
            y as f32 / rows as f32,
            previous.rect.width,
            previous.rect.height,
        );
        self.template = Some(Template {
            pixels: luma.slice(s![y..y + th, x..x + tw]).to_owned(),
            rect,
            frame_dim: (rows, cols),
        });
        Ok(Observation::new(rect, score))
    }

    fn reset(&mut self) {
        self.template = None;
    }
}

/// Offsets `0, step, -step, 2 * step, ...` out to `margin`. Zero always comes
/// first so a stationary target wins ties.
fn search_offsets(margin: isize, step: usize) -> Vec<isize> {
    (0..=margin.max(0))
        .step_by(step.max(1))
        .flat_map(|d| if d == 0 { vec![0] } else { vec![d, -d] })
        .collect()
}

/// Zero-mean normalized cross-correlation of two equally shaped patches,
/// in `[-1, 1]`. Flat patches correlate to zero.
fn normalized_cross_correlation(a: ArrayView2<f32>, b: ArrayView2<f32>) -> f32 {
    let (Some(mean_a), Some(mean_b)) = (a.mean(), b.mean()) else {
        return 0.0;
    };
    let (mut cross, mut var_a, mut var_b) = (0.0f32, 0.0f32, 0.0f32);
    Zip::from(a).and(b).for_each(|&p, &q| {
        let (p, q) = (p - mean_a, q - mean_b);
        cross += p * q;
        var_a += p * p;
        var_b += q * q;
    });
    let denom = (var_a * var_b).sqrt();
    if denom <= f32::EPSILON {
        0.0
    } else {
        cross / denom
    }
}
