//! Common `FrameSource` instance loader.

use std::io::{BufReader, ErrorKind, Read};
use vigil::prelude::v1::*;
use vigil::recorder::{FSEQ_MAGIC, FSEQ_VERSION};

/// Largest frame dimension accepted from a header before the input is
/// considered garbage.
const MAX_DIM: u32 = 1 << 14;

/// Create a frame source for the given input.
///
/// The input is expected to carry an `.fseq` frame sequence, either as a
/// regular file or, with a `tcp://` prefix, as a network stream (`@` as
/// the host listens and accepts instead of connecting).
pub fn create_source(input: &str) -> Result<Box<dyn FrameSource>> {
    let reader = vigil::utils::open_input(input)?;
    let reader = BufReader::new(reader);

    Ok(Box::new(FseqFile::new(reader)?))
}

struct FseqFile<T> {
    reader: T,
    width: usize,
    height: usize,
    framerate: f64,
}

impl<T: Read> FseqFile<T> {
    fn new(mut reader: T) -> Result<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != FSEQ_MAGIC {
            return Err(VigilError::MalformedSource("bad magic".into()).into());
        }

        let mut version = [0u8; 1];
        reader.read_exact(&mut version)?;
        if version[0] != FSEQ_VERSION {
            return Err(
                VigilError::MalformedSource(format!("unknown version {}", version[0])).into(),
            );
        }

        let mut dim = [[0u8; 4]; 2];
        for b in &mut dim {
            reader.read_exact(&mut *b)?;
        }
        let width = u32::from_le_bytes(dim[0]);
        let height = u32::from_le_bytes(dim[1]);

        if width == 0 || height == 0 || width > MAX_DIM || height > MAX_DIM {
            return Err(VigilError::MalformedSource(format!(
                "implausible dimensions {}x{}",
                width, height
            ))
            .into());
        }

        let mut framerate = [0u8; 8];
        reader.read_exact(&mut framerate)?;

        Ok(Self {
            reader,
            width: width as usize,
            height: height as usize,
            framerate: f64::from_le_bytes(framerate),
        })
    }
}

impl<T: Read> FrameSource for FseqFile<T> {
    /// Read the next frame of the stream into `frame`.
    ///
    /// A truncated tail frame (e.g. a recording cut off mid-write) is
    /// treated as a clean end of stream.
    fn read_frame(&mut self, frame: &mut Frame) -> Result<bool> {
        frame.resize(self.width, self.height);

        match self.reader.read_exact(frame.as_bytes_mut()) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn framerate(&self) -> Option<f64> {
        Some(self.framerate).filter(|f| f.is_finite() && *f > 0.0)
    }

    fn dim(&self) -> Option<(usize, usize)> {
        Some((self.width, self.height))
    }
}
