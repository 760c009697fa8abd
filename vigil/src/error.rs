//! Typed pipeline errors

use crate::occupancy::{MAX_UNOCCUPIED_TICKS, MIN_UNOCCUPIED_TICKS};
use thiserror::Error;

/// Errors produced by the core pipeline components.
///
/// These are explicit signals, not control flow: [`Error::InputMismatch`]
/// and [`Error::Storage`] are recoverable and the pipeline keeps streaming
/// after reporting them, while [`Error::Configuration`] is rejected before
/// the first frame is processed.
#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "unoccupied ticks value {0} outside {MIN_UNOCCUPIED_TICKS}..={MAX_UNOCCUPIED_TICKS}"
    )]
    Configuration(u32),
    #[error("frame dimensions {got:?} diverge from reference {expected:?}")]
    InputMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },
    #[error("cannot write footage: {0}")]
    Storage(#[source] std::io::Error),
    #[error("malformed frame source: {0}")]
    MalformedSource(String),
}
