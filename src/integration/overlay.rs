//! Overlay updates and the renderer-side coordinate conversion.

use crate::tracker::{CoordinateOrigin, NormalizedRect, Observation};

/// What the renderer should draw after one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayUpdate {
    /// Target rect in tracker space; zero-sized when nothing is tracked.
    pub rect: NormalizedRect,
    pub visible: bool,
    /// Index of the frame this update was computed from.
    pub frame_index: u64,
}

impl OverlayUpdate {
    /// Apply the caller-level confidence threshold to a session result.
    ///
    /// The threshold is inclusive. A hidden update still carries the
    /// low-confidence rect so renderers can debug-draw it; without any
    /// observation the rect collapses to zero.
    pub fn from_observation(
        observation: Option<&Observation>,
        threshold: f32,
        frame_index: u64,
    ) -> Self {
        match observation {
            Some(obs) => Self {
                rect: obs.rect,
                visible: obs.is_visible(threshold),
                frame_index,
            },
            None => Self::hidden(frame_index),
        }
    }

    pub fn hidden(frame_index: u64) -> Self {
        Self {
            rect: NormalizedRect::default(),
            visible: false,
            frame_index,
        }
    }
}

/// Receives overlay updates on the UI-owning thread.
pub trait OverlayRenderer {
    fn render(&mut self, update: OverlayUpdate);
}

impl<F: FnMut(OverlayUpdate)> OverlayRenderer for F {
    fn render(&mut self, update: OverlayUpdate) {
        self(update)
    }
}

/// Rectangle in layer (screen) units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayerRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl LayerRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Size and origin convention of the layer the overlay is drawn in.
///
/// This is the only place the vertical flip between tracker space and a
/// bottom-left-origin layer happens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerGeometry {
    pub width: f32,
    pub height: f32,
    pub origin: CoordinateOrigin,
}

impl LayerGeometry {
    pub fn new(width: f32, height: f32, origin: CoordinateOrigin) -> Self {
        Self {
            width,
            height,
            origin,
        }
    }

    /// Map a tracker-space rect into layer units.
    pub fn to_layer_rect(&self, rect: &NormalizedRect) -> LayerRect {
        let r = rect.convert(CoordinateOrigin::TopLeft, self.origin);
        LayerRect::new(
            r.x * self.width,
            r.y * self.height,
            r.width * self.width,
            r.height * self.height,
        )
    }

    /// Map a layer rect back into tracker space.
    ///
    /// Returns a zero rect for a zero-sized layer.
    pub fn to_normalized(&self, rect: &LayerRect) -> NormalizedRect {
        if self.width <= 0.0 || self.height <= 0.0 {
            return NormalizedRect::default();
        }
        NormalizedRect::new(
            rect.x / self.width,
            rect.y / self.height,
            rect.width / self.width,
            rect.height / self.height,
        )
        .convert(self.origin, CoordinateOrigin::TopLeft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[rstest]
    #[case::at_threshold(0.45, true)]
    #[case::below(0.44, false)]
    #[case::full(1.0, true)]
    fn test_threshold_is_inclusive(#[case] confidence: f32, #[case] visible: bool) {
        let obs = Observation::new(NormalizedRect::new(0.1, 0.1, 0.2, 0.2), confidence);
        let update = OverlayUpdate::from_observation(Some(&obs), 0.45, 3);
        assert_eq!(update.visible, visible);
        assert_eq!(update.rect, obs.rect);
        assert_eq!(update.frame_index, 3);
    }

    #[test]
    fn test_no_observation_is_hidden_zero_rect() {
        let update = OverlayUpdate::from_observation(None, 0.45, 0);
        assert!(!update.visible);
        assert_eq!(update.rect, NormalizedRect::default());
    }

    #[test]
    fn test_top_left_layer_scales_only() {
        let geometry = LayerGeometry::new(400.0, 800.0, CoordinateOrigin::TopLeft);
        let layer = geometry.to_layer_rect(&NormalizedRect::new(0.25, 0.5, 0.25, 0.125));
        assert_eq!(layer, LayerRect::new(100.0, 400.0, 100.0, 100.0));
    }

    #[test]
    fn test_bottom_left_layer_flips() {
        let geometry = LayerGeometry::new(400.0, 800.0, CoordinateOrigin::BottomLeft);
        let layer = geometry.to_layer_rect(&NormalizedRect::new(0.25, 0.0, 0.25, 0.125));
        // Top edge in tracker space sits at the top of a bottom-left layer
        assert_abs_diff_eq!(layer.y, 700.0, epsilon = 1e-3);
        assert_abs_diff_eq!(layer.height, 100.0, epsilon = 1e-3);
    }

    #[rstest]
    #[case::top_left(CoordinateOrigin::TopLeft)]
    #[case::bottom_left(CoordinateOrigin::BottomLeft)]
    fn test_layer_round_trip(#[case] origin: CoordinateOrigin) {
        let geometry = LayerGeometry::new(320.0, 240.0, origin);
        let rect = NormalizedRect::new(0.2, 0.3, 0.1, 0.4);
        let back = geometry.to_normalized(&geometry.to_layer_rect(&rect));
        assert_abs_diff_eq!(back.x, rect.x, epsilon = 1e-5);
        assert_abs_diff_eq!(back.y, rect.y, epsilon = 1e-5);
        assert_abs_diff_eq!(back.height, rect.height, epsilon = 1e-5);
    }

    #[test]
    fn test_closure_renderer() {
        let mut seen = Vec::new();
        let mut renderer = |update: OverlayUpdate| seen.push(update.visible);
        renderer.render(OverlayUpdate::hidden(0));
        assert_eq!(seen, vec![false]);
    }
}
