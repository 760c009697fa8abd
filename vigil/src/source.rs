//! # Frame acquisition

use crate::frame::Frame;
use anyhow::Result;

/// Sequential frame supplier.
///
/// Implemented by device wrappers and file readers alike. The pipeline
/// drives a source one frame at a time and treats end of stream as a clean
/// shutdown trigger.
pub trait FrameSource {
    /// Read the next frame of the stream into `frame`.
    ///
    /// The buffer is resized to the source's dimensions and overwritten.
    /// Returns `Ok(true)` when a frame was produced, `Ok(false)` on a
    /// clean end of stream, and `Err` when the source failed.
    fn read_frame(&mut self, frame: &mut Frame) -> Result<bool>;

    /// Get the framerate of the stream.
    ///
    /// This will return `Some(framerate)` if it is known. On realtime
    /// streams it may not always be known. In such cases, `None` is
    /// returned.
    fn framerate(&self) -> Option<f64>;

    /// Get frame dimensions of the stream, if known up front.
    fn dim(&self) -> Option<(usize, usize)>;
}
