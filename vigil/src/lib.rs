//! # Motion-based occupancy detection
//!
//! This library provides the core of a motion-activated security camera:
//! frame differencing against an adaptive reference frame, contour-style
//! motion detection, an occupancy state machine with decay hysteresis, and
//! a recording controller tied to occupancy transitions.
//!
//! The easiest way to use the library is to import its prelude:
//!
//! ```
//! use vigil::prelude::v1::*;
//! ```
//!
//! Frame acquisition is abstracted behind the [`source::FrameSource`]
//! trait, so any device or file reader producing RGBA frames can drive the
//! pipeline.

pub mod config;
pub mod delta;
pub mod detection;
pub mod error;
pub mod frame;
pub mod occupancy;
pub mod pipeline;
pub mod recorder;
pub mod source;
pub mod utils;

pub mod prelude {
    pub mod v1 {
        pub use crate::{
            config::CameraConfig,
            delta::DifferenceEngine,
            detection::{Detection, MotionDetector, Region},
            error::Error as VigilError,
            frame::{Frame, GrayFrame, Rgba},
            occupancy::{OccupancyState, OccupancyTracker, StatusUpdate, Transition},
            pipeline::{FrameReport, SecurityPipeline},
            recorder::RecordingController,
            source::FrameSource,
        };
        pub use anyhow::{anyhow, Error, Result};
    }
}
