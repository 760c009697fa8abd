//! Footage recording tied to occupancy transitions
//!
//! Sessions are written as `.fseq` containers: a small little-endian
//! header followed by packed RGBA frames. One file per occupancy episode,
//! named by the session's start time.

use crate::error::Error;
use crate::frame::Frame;
use crate::occupancy::Transition;
use chrono::Local;
use log::{info, warn};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Magic prefix of `.fseq` footage containers.
pub const FSEQ_MAGIC: [u8; 4] = *b"FSEQ";
/// Current container version.
pub const FSEQ_VERSION: u8 = 1;
/// Framerate stamped into footage when the source does not report one.
pub const DEFAULT_FRAMERATE: f64 = 29.95;

/// One open footage file. Live only while the room stays occupied.
struct RecordingSession {
    out: BufWriter<File>,
    path: PathBuf,
    frames: u64,
}

impl RecordingSession {
    fn create(path: PathBuf, (width, height): (usize, usize), framerate: f64) -> io::Result<Self> {
        let mut out = BufWriter::new(File::create(&path)?);

        out.write_all(&FSEQ_MAGIC)?;
        out.write_all(&[FSEQ_VERSION])?;
        out.write_all(&(width as u32).to_le_bytes())?;
        out.write_all(&(height as u32).to_le_bytes())?;
        out.write_all(&framerate.to_le_bytes())?;

        Ok(Self {
            out,
            path,
            frames: 0,
        })
    }

    fn append(&mut self, frame: &Frame) -> io::Result<()> {
        self.out.write_all(frame.as_bytes())?;
        self.frames += 1;
        Ok(())
    }

    fn finish(mut self) -> io::Result<(PathBuf, u64)> {
        self.out.flush()?;
        Ok((self.path, self.frames))
    }
}

/// Opens and closes recording sessions in step with occupancy transitions.
///
/// At most one session is live at a time. When disabled, every call is a
/// no-op and no file is ever created.
pub struct RecordingController {
    root: PathBuf,
    enabled: bool,
    framerate: f64,
    session: Option<RecordingSession>,
}

impl RecordingController {
    pub fn new(root: impl Into<PathBuf>, enabled: bool, framerate: f64) -> Self {
        Self {
            root: root.into(),
            enabled,
            framerate,
            session: None,
        }
    }

    /// React to this frame's occupancy transition.
    ///
    /// `Entered` opens a fresh session, `Exited` closes and flushes it, and
    /// quiet frames append to the session when one is open. A failure to
    /// open the destination is returned as [`Error::Storage`]; the episode
    /// is then forfeited and the next `Entered` retries.
    pub fn on_frame(&mut self, transition: Option<Transition>, frame: &Frame) -> Result<(), Error> {
        if !self.enabled {
            return Ok(());
        }

        match transition {
            Some(Transition::Entered) => self.open(frame.dim()),
            Some(Transition::Exited) => self.finish(),
            None => {
                if let Some(session) = &mut self.session {
                    session.append(frame).map_err(Error::Storage)?;
                }
                Ok(())
            }
        }
    }

    /// Whether a session is currently open.
    pub fn recording(&self) -> bool {
        self.session.is_some()
    }

    /// Close and flush any open session.
    ///
    /// Also the shutdown path: the pipeline calls this on every
    /// termination route so no footage is left unflushed.
    pub fn finish(&mut self) -> Result<(), Error> {
        if let Some(session) = self.session.take() {
            let (path, frames) = session.finish().map_err(Error::Storage)?;
            info!("wrote {} frames to {}", frames, path.display());
        }
        Ok(())
    }

    fn open(&mut self, dim: (usize, usize)) -> Result<(), Error> {
        if self.session.is_some() {
            // Entered without a matching Exited should not happen; keep
            // the old session rather than leak the handle.
            warn!("recording session already open, ignoring new session");
            return Ok(());
        }

        fs::create_dir_all(&self.root).map_err(Error::Storage)?;

        let path = self.session_path();
        let session = RecordingSession::create(path, dim, self.framerate).map_err(Error::Storage)?;
        info!("created footage writer {}", session.path.display());
        self.session = Some(session);

        Ok(())
    }

    /// Pick a fresh session file name.
    ///
    /// Millisecond start time, with a numeric suffix when episodes turn
    /// over faster than the clock ticks, so no session ever truncates an
    /// earlier one's footage.
    fn session_path(&self) -> PathBuf {
        let now = Local::now();
        let base = format!("{}_{}", now.format("%Y-%m-%d"), now.timestamp_millis());

        let mut path = self.root.join(format!("{}.fseq", base));
        let mut n = 1u32;
        while path.exists() {
            path = self.root.join(format!("{}-{}.fseq", base, n));
            n += 1;
        }

        path
    }
}

impl Drop for RecordingController {
    fn drop(&mut self) {
        if self.session.is_some() {
            warn!("recording session dropped without shutdown, flushing");
            let _ = self.finish();
        }
    }
}

/// Expected byte length of an `.fseq` header.
pub fn header_len() -> usize {
    FSEQ_MAGIC.len() + 1 + 4 + 4 + 8
}

/// Check that a footage directory is usable, creating it if absent.
pub fn prepare_footage_dir(root: &Path) -> Result<(), Error> {
    fs::create_dir_all(root).map_err(Error::Storage)
}
