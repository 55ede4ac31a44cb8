//! Trait for video frame producers.

use crate::tracker::Frame;

/// Trait for anything that delivers video frames in capture order.
///
/// Implement this trait to feed a camera, a decoder or a test fixture into
/// a [`TrackerPipeline`](crate::TrackerPipeline).
///
/// # Example
///
/// ```ignore
/// use objtrack_rs::{Frame, FrameSource};
///
/// struct Camera {
///     // Your capture handle here
/// }
///
/// impl FrameSource for Camera {
///     type Error = std::io::Error;
///
///     fn next_frame(&mut self) -> Option<Result<Frame, Self::Error>> {
///         // Block until the next buffer arrives, or return None when the
///         // device is closed
///         None
///     }
/// }
/// ```
pub trait FrameSource {
    /// Error type for capture failures.
    type Error: std::fmt::Display;

    /// Next frame, an error for a frame that could not be delivered, or
    /// `None` once the source is exhausted.
    fn next_frame(&mut self) -> Option<Result<Frame, Self::Error>>;
}

/// Adapts an iterator of frames into a [`FrameSource`] that never fails.
#[derive(Debug, Clone)]
pub struct IterFrameSource<I> {
    frames: I,
}

impl<I: Iterator<Item = Frame>> IterFrameSource<I> {
    pub fn new(frames: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            frames: frames.into_iter(),
        }
    }
}

impl<I: Iterator<Item = Frame>> FrameSource for IterFrameSource<I> {
    type Error = std::convert::Infallible;

    fn next_frame(&mut self) -> Option<Result<Frame, Self::Error>> {
        self.frames.next().map(Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::PixelFormat;

    #[test]
    fn test_iter_source_yields_in_order_then_ends() {
        let frames: Vec<Frame> = (0..3)
            .map(|i| Frame::new(vec![0u8; 4], 2, 2, PixelFormat::Gray8, i).unwrap())
            .collect();
        let mut source = IterFrameSource::new(frames);

        for expected in 0..3 {
            let frame = source.next_frame().unwrap().unwrap();
            assert_eq!(frame.index(), expected);
        }
        assert!(source.next_frame().is_none());
    }
}
