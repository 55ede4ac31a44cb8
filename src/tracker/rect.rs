/// Vertical origin convention of a normalized coordinate space.
///
/// Tracker space is always [`CoordinateOrigin::TopLeft`]. Capture metadata
/// and some display layers use a bottom-left origin; converting between the
/// two is the renderer's job, never the session's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateOrigin {
    /// (0, 0) is the top-left corner, y grows downward.
    #[default]
    TopLeft,
    /// (0, 0) is the bottom-left corner, y grows upward.
    BottomLeft,
}

const EDGE_TOLERANCE: f32 = 1e-5;

/// Axis-aligned rectangle in normalized frame coordinates.
///
/// All fields are fractions of the frame size, so a rect covering the whole
/// frame is `(0, 0, 1, 1)` regardless of resolution. In tracker space the
/// origin is the top-left corner (see [`CoordinateOrigin`]).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NormalizedRect {
    /// Left edge
    pub x: f32,
    /// Top edge (tracker space)
    pub y: f32,
    /// Width as a fraction of frame width
    pub width: f32,
    /// Height as a fraction of frame height
    pub height: f32,
}

impl NormalizedRect {
    /// Create a rect from its top-left corner and size.
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rect of the given size centered on `(cx, cy)`.
    #[inline]
    pub fn from_center(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }

    /// Create a rect from TLBR corners (left, top, right, bottom).
    #[inline]
    pub fn from_tlbr(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// Convert to TLBR format: (x1, y1, x2, y2).
    #[inline]
    pub fn to_tlbr(&self) -> [f32; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }

    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// True when every edge lies inside the unit square, up to float noise.
    pub fn is_normalized(&self) -> bool {
        let unit = -EDGE_TOLERANCE..=1.0 + EDGE_TOLERANCE;
        self.width >= 0.0
            && self.height >= 0.0
            && self.to_tlbr().iter().all(|edge| unit.contains(edge))
    }

    /// Intersect with the unit square. A rect entirely outside collapses to
    /// zero size on the nearest edge. A rect already inside is returned
    /// bit-for-bit unchanged.
    pub fn clamped(&self) -> Self {
        let [x1, y1, x2, y2] = self.to_tlbr();
        let inside = x1 >= 0.0 && y1 >= 0.0 && x2 <= 1.0 && y2 <= 1.0;
        if inside && self.width >= 0.0 && self.height >= 0.0 {
            return *self;
        }
        // max/min rather than clamp: NaN edges must not panic
        let x1 = x1.max(0.0).min(1.0);
        let y1 = y1.max(0.0).min(1.0);
        let x2 = x2.max(x1).min(1.0);
        let y2 = y2.max(y1).min(1.0);
        Self::from_tlbr(x1, y1, x2, y2)
    }

    /// Shift by `(dx, dy)` normalized units.
    #[inline]
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Mirror across the horizontal center line, swapping a top-left origin
    /// for a bottom-left one (and back).
    #[inline]
    pub fn flipped_vertically(&self) -> Self {
        Self::new(self.x, 1.0 - self.y - self.height, self.width, self.height)
    }

    /// Re-express this rect, given in `from` convention, in `to` convention.
    pub fn convert(&self, from: CoordinateOrigin, to: CoordinateOrigin) -> Self {
        if from == to {
            *self
        } else {
            self.flipped_vertically()
        }
    }

    /// Whether any part of the rect overlaps the unit square.
    pub fn intersects_unit(&self) -> bool {
        let [x1, y1, x2, y2] = self.to_tlbr();
        x2 > 0.0 && y2 > 0.0 && x1 < 1.0 && y1 < 1.0
    }

    /// Pixel window `(x0, y0, width, height)` covered by this rect in a
    /// `frame_width x frame_height` image, clipped to the image.
    ///
    /// Returns `None` when fewer than 2x2 pixels remain.
    pub(crate) fn pixel_window(
        &self,
        frame_width: usize,
        frame_height: usize,
    ) -> Option<(usize, usize, usize, usize)> {
        let clip = |v: f32, extent: usize| {
            (v * extent as f32).round().clamp(0.0, extent as f32) as usize
        };
        let [x1, y1, x2, y2] = self.to_tlbr();
        let (px1, px2) = (clip(x1, frame_width), clip(x2, frame_width));
        let (py1, py2) = (clip(y1, frame_height), clip(y2, frame_height));
        let (w, h) = (px2.saturating_sub(px1), py2.saturating_sub(py1));
        if w < 2 || h < 2 {
            return None;
        }
        Some((px1, py1, w, h))
    }
}
