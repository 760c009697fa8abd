//! Frame-at-a-time security pipeline
//!
//! Wires differencing, detection, occupancy tracking and recording into a
//! single synchronous step. Each frame is fully processed before the next
//! is acquired; every stage's state is exclusively owned here, so there is
//! no locking anywhere.

use crate::config::CameraConfig;
use crate::delta::DifferenceEngine;
use crate::detection::{MotionDetector, Region};
use crate::error::Error;
use crate::frame::{Frame, GrayFrame};
use crate::occupancy::{OccupancyState, OccupancyTracker, Transition};
use crate::recorder::{RecordingController, DEFAULT_FRAMERATE};
use anyhow::Result;
use log::warn;

/// Per-frame pipeline output for display and annotation consumers.
#[derive(Clone, Debug)]
pub struct FrameReport {
    /// Derived room status label source.
    pub status: OccupancyState,
    /// Occupancy edge crossed on this frame, if any.
    pub transition: Option<Transition>,
    /// Detected motion regions, empty while unobserved.
    pub regions: Vec<Region>,
    /// Delta image against the reference. `None` while the reference is
    /// still priming or when the frame was skipped.
    pub delta: Option<GrayFrame>,
}

impl FrameReport {
    fn quiet(status: OccupancyState, delta: Option<GrayFrame>) -> Self {
        Self {
            status,
            transition: None,
            regions: vec![],
            delta,
        }
    }
}

/// The complete motion-to-footage pipeline.
pub struct SecurityPipeline {
    engine: DifferenceEngine,
    detector: MotionDetector,
    tracker: OccupancyTracker,
    recorder: RecordingController,
    frames: u64,
}

impl SecurityPipeline {
    /// Build a pipeline from validated configuration.
    ///
    /// `framerate` is stamped into recordings; pass the source's rate when
    /// known.
    pub fn new(config: &CameraConfig, framerate: Option<f64>) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self {
            engine: DifferenceEngine::new(),
            detector: MotionDetector::default(),
            tracker: OccupancyTracker::new(config.unoccupied_ticks)?,
            recorder: RecordingController::new(
                &config.footage_dir,
                config.record,
                framerate.unwrap_or(DEFAULT_FRAMERATE),
            ),
            frames: 0,
        })
    }

    /// Process one frame: difference, detect, update occupancy, record.
    ///
    /// A frame whose dimensions diverge from the reference is skipped
    /// whole (detection, state and recording untouched) and reported with
    /// the prior status. A recording failure forfeits the episode but does
    /// not stop the stream.
    pub fn process_frame(&mut self, frame: &Frame) -> Result<FrameReport> {
        self.frames += 1;

        let delta = match self.engine.compute_delta(frame) {
            Ok(Some(delta)) => delta,
            // First frame primed the reference; detection skips this cycle.
            Ok(None) => return Ok(FrameReport::quiet(self.tracker.state(), None)),
            Err(err @ Error::InputMismatch { .. }) => {
                warn!("skipping frame {}: {}", self.frames, err);
                return Ok(FrameReport::quiet(self.tracker.state(), None));
            }
            Err(err) => return Err(err.into()),
        };

        let detection = self.detector.detect(&delta);
        let update = self.tracker.observe(detection.motion_observed());

        if update.motion_confirmed {
            self.engine.adopt_reference();
        }

        if let Err(err) = self.recorder.on_frame(update.transition, frame) {
            warn!("recording unavailable: {}", err);
        }

        Ok(FrameReport {
            status: update.status,
            transition: update.transition,
            regions: detection.regions,
            delta: Some(delta),
        })
    }

    /// Number of frames fed so far, including skipped ones.
    pub fn frames_processed(&self) -> u64 {
        self.frames
    }

    /// Whether footage is being written right now.
    pub fn recording(&self) -> bool {
        self.recorder.recording()
    }

    /// Flush and close any open recording session.
    ///
    /// Must run on every termination path, before the frame source is
    /// released.
    pub fn shutdown(&mut self) -> Result<()> {
        self.recorder.finish()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Rgba;
    use std::fs;
    use std::path::PathBuf;

    const DIM: (usize, usize) = (120, 90);

    fn config(ticks: u32, record: bool, footage_dir: &PathBuf) -> CameraConfig {
        CameraConfig {
            record,
            unoccupied_ticks: ticks,
            footage_dir: footage_dir.clone(),
            ..Default::default()
        }
    }

    fn background() -> Frame {
        let mut frame = Frame::new(DIM.0, DIM.1);
        frame.data_mut().fill(Rgba {
            r: 20,
            g: 20,
            b: 20,
            a: 255,
        });
        frame
    }

    /// Background with a bright square somewhere in the middle.
    fn intruder(offset: usize) -> Frame {
        let mut frame = background();
        for y in 20..60 {
            for x in (20 + offset)..(60 + offset) {
                frame.data_mut()[y * DIM.0 + x] = Rgba {
                    r: 240,
                    g: 240,
                    b: 240,
                    a: 255,
                };
            }
        }
        frame
    }

    fn temp_root(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vigil-pipeline-{}-{}", tag, std::process::id()))
    }

    #[test]
    fn static_scene_stays_unoccupied() {
        let root = temp_root("static");
        let mut pipeline = SecurityPipeline::new(&config(25, false, &root), None).unwrap();

        let frame = background();
        for _ in 0..30 {
            let report = pipeline.process_frame(&frame).unwrap();
            assert_eq!(report.status, OccupancyState::Unoccupied);
            assert!(report.regions.is_empty());
        }
    }

    #[test]
    fn motion_drives_full_occupancy_episode() {
        let root = temp_root("episode");
        let mut pipeline = SecurityPipeline::new(&config(25, false, &root), None).unwrap();

        // Prime the reference.
        pipeline.process_frame(&background()).unwrap();

        let report = pipeline.process_frame(&intruder(0)).unwrap();
        assert_eq!(report.status, OccupancyState::Occupied);
        assert_eq!(report.transition, Some(Transition::Entered));
        assert!(!report.regions.is_empty());

        // The intruder freezes; the adopted reference makes the scene
        // static again, so the decay buffer carries the state.
        for _ in 0..24 {
            let report = pipeline.process_frame(&intruder(0)).unwrap();
            assert_eq!(report.status, OccupancyState::Occupied);
            assert_eq!(report.transition, None);
            assert!(report.regions.is_empty());
        }

        let report = pipeline.process_frame(&intruder(0)).unwrap();
        assert_eq!(report.status, OccupancyState::Unoccupied);
        assert_eq!(report.transition, Some(Transition::Exited));
    }

    #[test]
    fn moving_intruder_keeps_resetting_decay() {
        let root = temp_root("moving");
        let mut pipeline = SecurityPipeline::new(&config(25, false, &root), None).unwrap();

        pipeline.process_frame(&background()).unwrap();
        pipeline.process_frame(&intruder(0)).unwrap();

        for step in 1..=6 {
            let report = pipeline.process_frame(&intruder(step * 10)).unwrap();
            assert_eq!(report.status, OccupancyState::Occupied);
            assert!(!report.regions.is_empty(), "step {}", step);
            assert_eq!(report.transition, None);
        }
    }

    #[test]
    fn mismatched_frame_is_skipped_and_state_kept() {
        let root = temp_root("mismatch");
        let mut pipeline = SecurityPipeline::new(&config(25, false, &root), None).unwrap();

        pipeline.process_frame(&background()).unwrap();
        pipeline.process_frame(&intruder(0)).unwrap();

        let odd = Frame::new(10, 10);
        let report = pipeline.process_frame(&odd).unwrap();
        assert_eq!(report.status, OccupancyState::Occupied);
        assert_eq!(report.transition, None);
        assert!(report.delta.is_none());

        // Stream continues normally afterwards.
        let report = pipeline.process_frame(&intruder(0)).unwrap();
        assert!(report.delta.is_some());
    }

    #[test]
    fn recording_follows_occupancy_transitions() {
        let root = temp_root("record");
        let _ = fs::remove_dir_all(&root);

        let mut pipeline = SecurityPipeline::new(&config(25, true, &root), None).unwrap();

        pipeline.process_frame(&background()).unwrap();
        assert!(!pipeline.recording());

        pipeline.process_frame(&intruder(0)).unwrap();
        assert!(pipeline.recording());

        for _ in 0..24 {
            pipeline.process_frame(&intruder(0)).unwrap();
            assert!(pipeline.recording());
        }

        pipeline.process_frame(&intruder(0)).unwrap();
        assert!(!pipeline.recording());

        let files: Vec<_> = fs::read_dir(&root).unwrap().collect();
        assert_eq!(files.len(), 1);

        pipeline.shutdown().unwrap();
        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn record_disabled_never_touches_storage() {
        let root = temp_root("norecord");
        let _ = fs::remove_dir_all(&root);

        let mut pipeline = SecurityPipeline::new(&config(25, false, &root), None).unwrap();

        pipeline.process_frame(&background()).unwrap();
        for _ in 0..30 {
            pipeline.process_frame(&intruder(0)).unwrap();
        }
        pipeline.shutdown().unwrap();

        assert!(!root.exists());
    }

    #[test]
    fn shutdown_closes_open_session() {
        let root = temp_root("shutdown");
        let _ = fs::remove_dir_all(&root);

        let mut pipeline = SecurityPipeline::new(&config(25, true, &root), None).unwrap();

        pipeline.process_frame(&background()).unwrap();
        pipeline.process_frame(&intruder(0)).unwrap();
        pipeline.process_frame(&intruder(3)).unwrap();
        assert!(pipeline.recording());

        pipeline.shutdown().unwrap();
        assert!(!pipeline.recording());

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn invalid_ticks_fail_before_any_frame() {
        let root = temp_root("invalid");
        assert!(SecurityPipeline::new(&config(10, false, &root), None).is_err());
        assert!(SecurityPipeline::new(&config(3000, false, &root), None).is_err());
    }
}
