//! Frame differencing against an adaptive reference
//!
//! The engine retains a single grayscale, blurred reference frame and
//! differences every incoming frame against it. The reference is replaced
//! whenever downstream detection confirms motion, so the baseline tracks
//! slow scene drift instead of permanently flagging the original scene.

use crate::error::Error;
use crate::frame::{Frame, GrayFrame};

/// Stateful frame differencer.
#[derive(Default)]
pub struct DifferenceEngine {
    reference: Option<GrayFrame>,
    current: Option<GrayFrame>,
}

impl DifferenceEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert `frame` to the comparable representation and difference it
    /// against the reference.
    ///
    /// The very first call stores the converted frame as the reference and
    /// returns `Ok(None)`, meaning no delta is available yet and detection
    /// should be skipped for this cycle. Later calls return the absolute
    /// per-pixel difference, or [`Error::InputMismatch`] when the frame's
    /// dimensions diverge from the reference.
    pub fn compute_delta(&mut self, frame: &Frame) -> Result<Option<GrayFrame>, Error> {
        let gray = frame.to_gray().blurred();

        let reference = match &self.reference {
            Some(reference) => reference,
            None => {
                self.reference = Some(gray);
                return Ok(None);
            }
        };

        if reference.dim() != gray.dim() {
            self.current = None;
            return Err(Error::InputMismatch {
                expected: reference.dim(),
                got: gray.dim(),
            });
        }

        let delta = reference.absdiff(&gray);
        self.current = Some(gray);

        Ok(Some(delta))
    }

    /// Replace the reference with the most recently converted frame.
    ///
    /// Called on confirmed motion, including mid-episode, so the baseline
    /// adapts instead of comparing against an ever-staler scene.
    pub fn adopt_reference(&mut self) {
        if let Some(current) = self.current.take() {
            self.reference = Some(current);
        }
    }

    /// Whether a reference frame has been established.
    pub fn has_reference(&self) -> bool {
        self.reference.is_some()
    }
}
