//! Camera configuration

use crate::error::Error;
use crate::occupancy::{MAX_UNOCCUPIED_TICKS, MIN_UNOCCUPIED_TICKS};
use std::path::PathBuf;

/// Immutable camera policy, fixed before the pipeline starts.
///
/// Deliberately carries no device or file handles; those are owned by the
/// pipeline and its recording controller.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub struct CameraConfig {
    /// Report region bounding boxes to the display layer.
    pub bounding_boxes: bool,
    /// Render the live feed.
    pub feed: bool,
    /// Stamp the room status onto the display output.
    pub occupation_stamp: bool,
    /// Stamp the wall-clock time onto the display output.
    pub time_stamp: bool,
    /// Persist footage while the room is occupied.
    pub record: bool,
    /// Decay buffer maximum, in frames. Valid range 25..=2500.
    pub unoccupied_ticks: u32,
    /// Directory recordings are written into. Created if absent.
    pub footage_dir: PathBuf,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            bounding_boxes: false,
            feed: false,
            occupation_stamp: false,
            time_stamp: true,
            record: false,
            unoccupied_ticks: 50,
            footage_dir: "security_footage".into(),
        }
    }
}

impl CameraConfig {
    /// Check value ranges.
    ///
    /// Must pass before the pipeline is constructed; range problems are a
    /// startup failure, never a per-frame one.
    pub fn validate(&self) -> Result<(), Error> {
        if !(MIN_UNOCCUPIED_TICKS..=MAX_UNOCCUPIED_TICKS).contains(&self.unoccupied_ticks) {
            return Err(Error::Configuration(self.unoccupied_ticks));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(CameraConfig::default().validate().is_ok());
    }

    #[test]
    fn out_of_range_ticks_fail_validation() {
        for ticks in [10, 3000] {
            let config = CameraConfig {
                unoccupied_ticks: ticks,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(Error::Configuration(t)) if t == ticks
            ));
        }
    }
}
