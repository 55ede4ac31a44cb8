//! Video frames as delivered by a frame source.

use ndarray::Array2;

use crate::tracker::error::FrameError;

/// Pixel layout of a frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// One byte of luminance per pixel
    #[default]
    Gray8,
    /// Packed R, G, B bytes
    Rgb8,
    /// Packed B, G, R, A bytes (the usual camera capture layout)
    Bgra8,
}

impl PixelFormat {
    #[inline]
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Bgra8 => 4,
        }
    }
}

/// A single video frame: contiguous pixel bytes in row-major order.
///
/// The session treats frames as opaque; only tracking primitives look at
/// the pixels, usually through [`Frame::luma`].
#[derive(Debug, Clone)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    format: PixelFormat,
    index: u64,
}

impl Frame {
    /// Wrap a pixel buffer, checking that its length matches the dimensions.
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
        index: u64,
    ) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::EmptyFrame);
        }
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if data.len() != expected {
            return Err(FrameError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            format,
            index,
        })
    }

    /// Build a grayscale frame from a luminance plane (values in `0..=255`).
    pub fn from_luma(plane: &Array2<f32>, index: u64) -> Result<Self, FrameError> {
        let (rows, cols) = plane.dim();
        let data = plane
            .iter()
            .map(|&v| v.round().clamp(0.0, 255.0) as u8)
            .collect();
        Self::new(data, cols as u32, rows as u32, PixelFormat::Gray8, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    /// Luminance plane of shape `(height, width)` with values in `0..=255`.
    ///
    /// Color formats use BT.601 weights.
    pub fn luma(&self) -> Array2<f32> {
        let width = self.width as usize;
        let bpp = self.format.bytes_per_pixel();
        Array2::from_shape_fn((self.height as usize, width), |(y, x)| {
            let px = &self.data[(y * width + x) * bpp..][..bpp];
            match self.format {
                PixelFormat::Gray8 => px[0] as f32,
                PixelFormat::Rgb8 => luminance(px[0], px[1], px[2]),
                PixelFormat::Bgra8 => luminance(px[2], px[1], px[0]),
            }
        })
    }
}

#[inline]
fn luminance(r: u8, g: u8, b: u8) -> f32 {
    0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
}
