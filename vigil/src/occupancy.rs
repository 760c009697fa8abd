//! Occupancy state machine
//!
//! Tracks whether the observed room is occupied, with a decay buffer that
//! bridges brief gaps in detected motion so the state does not flap.

use crate::error::Error;

/// Smallest accepted decay buffer maximum.
pub const MIN_UNOCCUPIED_TICKS: u32 = 25;
/// Largest accepted decay buffer maximum.
pub const MAX_UNOCCUPIED_TICKS: u32 = 2500;

/// Discrete room status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OccupancyState {
    Unoccupied,
    Occupied,
}

impl OccupancyState {
    /// Status label consumed by stamps and overlays.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unoccupied => "Unoccupied",
            Self::Occupied => "Occupied",
        }
    }
}

/// Edge between occupancy states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Entered,
    Exited,
}

/// Per-frame output of the state machine.
#[derive(Clone, Copy, Debug)]
pub struct StatusUpdate {
    pub status: OccupancyState,
    pub transition: Option<Transition>,
    /// True when motion was observed this frame, i.e. the differencing
    /// stage should adopt the current frame as its new reference.
    pub motion_confirmed: bool,
}

/// Occupancy tracker with decay hysteresis.
///
/// Any motion observation resets the decay buffer to its configured
/// maximum; each quiet frame while occupied decrements it by one. The
/// state only falls back to unoccupied once the buffer hits zero.
pub struct OccupancyTracker {
    state: OccupancyState,
    decay: u32,
    max_ticks: u32,
}

impl OccupancyTracker {
    /// Create a tracker, validating the configured decay maximum.
    pub fn new(unoccupied_ticks: u32) -> Result<Self, Error> {
        if !(MIN_UNOCCUPIED_TICKS..=MAX_UNOCCUPIED_TICKS).contains(&unoccupied_ticks) {
            return Err(Error::Configuration(unoccupied_ticks));
        }

        Ok(Self {
            state: OccupancyState::Unoccupied,
            decay: 0,
            max_ticks: unoccupied_ticks,
        })
    }

    /// Feed one frame's motion observation and advance the state.
    pub fn observe(&mut self, motion_observed: bool) -> StatusUpdate {
        let transition = if motion_observed {
            self.decay = self.max_ticks;
            match self.state {
                OccupancyState::Unoccupied => {
                    self.state = OccupancyState::Occupied;
                    Some(Transition::Entered)
                }
                OccupancyState::Occupied => None,
            }
        } else if self.state == OccupancyState::Occupied {
            self.decay -= 1;
            if self.decay == 0 {
                self.state = OccupancyState::Unoccupied;
                Some(Transition::Exited)
            } else {
                None
            }
        } else {
            None
        };

        StatusUpdate {
            status: self.state,
            transition,
            motion_confirmed: motion_observed,
        }
    }

    /// Current state.
    pub fn state(&self) -> OccupancyState {
        self.state
    }

    /// Frames left until the occupied state decays, absent new motion.
    pub fn decay_remaining(&self) -> u32 {
        self.decay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_ticks() {
        for ticks in [0, 10, 24, 2501, 3000] {
            assert!(matches!(
                OccupancyTracker::new(ticks),
                Err(Error::Configuration(t)) if t == ticks
            ));
        }
        for ticks in [25, 50, 2500] {
            assert!(OccupancyTracker::new(ticks).is_ok());
        }
    }

    #[test]
    fn unoccupied_until_first_motion() {
        let mut tracker = OccupancyTracker::new(25).unwrap();
        for _ in 0..100 {
            let update = tracker.observe(false);
            assert_eq!(update.status, OccupancyState::Unoccupied);
            assert_eq!(update.transition, None);
        }
    }

    #[test]
    fn occupied_through_full_decay() {
        // Motion on frame 1, then quiet: occupied through frame 25,
        // unoccupied from frame 26.
        let mut tracker = OccupancyTracker::new(25).unwrap();

        let update = tracker.observe(true);
        assert_eq!(update.status, OccupancyState::Occupied);
        assert_eq!(update.transition, Some(Transition::Entered));

        for frame in 2..=25 {
            let update = tracker.observe(false);
            assert_eq!(update.status, OccupancyState::Occupied, "frame {}", frame);
            assert_eq!(update.transition, None, "frame {}", frame);
        }

        let update = tracker.observe(false);
        assert_eq!(update.status, OccupancyState::Unoccupied);
        assert_eq!(update.transition, Some(Transition::Exited));
    }

    #[test]
    fn motion_resets_decay_to_maximum() {
        // Motion on frames 1 and 30 with 50 ticks: the buffer refills at
        // frame 30 and the exit lands exactly on frame 80.
        let mut tracker = OccupancyTracker::new(50).unwrap();

        tracker.observe(true);
        for _ in 2..30 {
            tracker.observe(false);
        }

        let update = tracker.observe(true);
        assert_eq!(update.status, OccupancyState::Occupied);
        assert_eq!(update.transition, None);
        assert_eq!(tracker.decay_remaining(), 50);

        for frame in 31..80 {
            let update = tracker.observe(false);
            assert_eq!(update.status, OccupancyState::Occupied, "frame {}", frame);
        }

        let update = tracker.observe(false);
        assert_eq!(update.status, OccupancyState::Unoccupied);
        assert_eq!(update.transition, Some(Transition::Exited));
    }

    #[test]
    fn decay_stays_within_bounds() {
        let mut tracker = OccupancyTracker::new(25).unwrap();
        for i in 0..1000u32 {
            // Irregular but deterministic motion pattern.
            let motion = i % 7 == 0 || i % 11 == 3;
            let update = tracker.observe(motion);
            assert!(tracker.decay_remaining() <= 25);
            if motion {
                assert_eq!(tracker.decay_remaining(), 25);
                assert_eq!(update.status, OccupancyState::Occupied);
            }
            assert_eq!(
                update.status == OccupancyState::Occupied,
                tracker.decay_remaining() > 0
            );
        }
    }

    #[test]
    fn reentry_emits_fresh_entered_event() {
        let mut tracker = OccupancyTracker::new(25).unwrap();
        for _ in 0..2 {
            let update = tracker.observe(true);
            assert_eq!(update.transition, Some(Transition::Entered));
            for _ in 0..24 {
                assert_eq!(tracker.observe(false).transition, None);
            }
            assert_eq!(tracker.observe(false).transition, Some(Transition::Exited));
        }
    }
}
