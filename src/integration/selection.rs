//! Builder turning a tap on the overlay layer into a target rect.

use crate::integration::overlay::{LayerGeometry, LayerRect};
use crate::tracker::{CoordinateOrigin, NormalizedRect};

/// Side of the square selection box, in layer units.
pub const DEFAULT_SELECTION_SIZE: f32 = 100.0;

/// Builder for the fixed-size target rect centered on a tap.
///
/// The tap and box size are in layer units; the result is in tracker space
/// and clamped to the unit square.
#[derive(Debug, Clone)]
pub struct SelectionBuilder {
    geometry: LayerGeometry,
    tap: (f32, f32),
    size: (f32, f32),
}

impl SelectionBuilder {
    /// Create a builder for a layer of the given geometry.
    pub fn new(geometry: LayerGeometry) -> Self {
        Self {
            geometry,
            tap: (0.0, 0.0),
            size: (DEFAULT_SELECTION_SIZE, DEFAULT_SELECTION_SIZE),
        }
    }

    /// Builder for a top-left-origin layer of `width x height`.
    pub fn for_layer(width: f32, height: f32) -> Self {
        Self::new(LayerGeometry::new(width, height, CoordinateOrigin::TopLeft))
    }

    /// Set the tap location in layer units.
    pub fn tap(mut self, x: f32, y: f32) -> Self {
        self.tap = (x, y);
        self
    }

    /// Set the selection box size in layer units.
    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.size = (width, height);
        self
    }

    /// The selection box in layer units, before clamping.
    pub fn layer_rect(&self) -> LayerRect {
        let (cx, cy) = self.tap;
        let (w, h) = self.size;
        LayerRect::new(cx - w / 2.0, cy - h / 2.0, w, h)
    }

    /// Build the target rect in tracker space.
    pub fn build(self) -> NormalizedRect {
        self.geometry.to_normalized(&self.layer_rect()).clamped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_centered_on_tap() {
        let rect = SelectionBuilder::for_layer(400.0, 800.0).tap(200.0, 400.0).build();

        let (cx, cy) = rect.center();
        assert_abs_diff_eq!(cx, 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(cy, 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(rect.width, 0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(rect.height, 0.125, epsilon = 1e-6);
    }

    #[test]
    fn test_custom_size() {
        let rect = SelectionBuilder::for_layer(200.0, 200.0)
            .tap(100.0, 100.0)
            .size(50.0, 20.0)
            .build();

        assert_abs_diff_eq!(rect.width, 0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(rect.height, 0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_tap_near_edge_is_clamped() {
        let rect = SelectionBuilder::for_layer(400.0, 400.0).tap(10.0, 10.0).build();

        assert!(rect.is_normalized());
        assert_eq!(rect.x, 0.0);
        assert_eq!(rect.y, 0.0);
        assert_abs_diff_eq!(rect.width, 60.0 / 400.0, epsilon = 1e-6);
    }

    #[test]
    fn test_bottom_left_layer_flips_into_tracker_space() {
        let geometry = LayerGeometry::new(400.0, 400.0, CoordinateOrigin::BottomLeft);
        // Tap near the bottom of a bottom-left layer means near y = 0 there,
        // which is the bottom of the frame in tracker space.
        let rect = SelectionBuilder::new(geometry).tap(200.0, 60.0).build();

        let (_, cy) = rect.center();
        assert_abs_diff_eq!(cy, 1.0 - 60.0 / 400.0, epsilon = 1e-6);
    }
}
