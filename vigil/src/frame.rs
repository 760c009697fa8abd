//! # Frame buffers
//!
//! Raw RGBA and grayscale frame types shared by every pipeline stage.
//! Conversion and blurring are fixed, deterministic integer functions so
//! identical input frames always produce identical results.

use bytemuck::{Pod, Zeroable};

/// Blur radius of a single box pass. Three passes approximate the 21-tap
/// Gaussian the detection constants were tuned against.
const BLUR_RADIUS: usize = 3;
const BLUR_PASSES: usize = 3;

/// RGBA colour structure.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Convert from a slice containing `[r, g, b]` elements.
    pub fn from_rgb_slice(rgb: &[u8]) -> Self {
        Self {
            r: rgb[0],
            g: rgb[1],
            b: rgb[2],
            a: 255,
        }
    }

    /// Convert from a slice containing `[r, g, b, a]` elements.
    pub fn from_rgba_slice(rgba: &[u8]) -> Self {
        Self {
            r: rgba[0],
            g: rgba[1],
            b: rgba[2],
            a: rgba[3],
        }
    }

    /// Integer BT.601 luma of the pixel.
    pub fn luma(&self) -> u8 {
        ((self.r as u32 * 77 + self.g as u32 * 150 + self.b as u32 * 29) >> 8) as u8
    }
}

/// Owned RGBA frame.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    data: Vec<Rgba>,
    width: usize,
}

impl Frame {
    /// Create a new black frame of the given dimensions.
    pub fn new(width: usize, height: usize) -> Self {
        let mut frame = Self::default();
        frame.resize(width, height);
        frame
    }

    /// Get width and height of the frame.
    pub fn dim(&self) -> (usize, usize) {
        if self.width == 0 {
            (0, 0)
        } else {
            (self.width, self.data.len() / self.width)
        }
    }

    /// Resize the buffer to the given dimensions, keeping existing pixels
    /// where they overlap. Meant for reuse across `read_frame` calls.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.data.resize(
            width * height,
            Rgba {
                r: 0,
                g: 0,
                b: 0,
                a: 255,
            },
        );
    }

    /// Pixels in row-major order.
    pub fn data(&self) -> &[Rgba] {
        &self.data
    }

    /// Mutable pixels in row-major order.
    pub fn data_mut(&mut self) -> &mut [Rgba] {
        &mut self.data
    }

    /// View the frame as packed little-endian bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Mutable byte view, for filling the frame straight from a reader.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(&mut self.data)
    }

    /// Convert the frame to grayscale.
    pub fn to_gray(&self) -> GrayFrame {
        GrayFrame {
            data: self.data.iter().map(Rgba::luma).collect(),
            width: self.width,
        }
    }
}

/// Owned single-channel frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GrayFrame {
    data: Vec<u8>,
    width: usize,
}

impl GrayFrame {
    /// Create a new zeroed frame of the given dimensions.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: vec![0; width * height],
            width,
        }
    }

    /// Get width and height of the frame.
    pub fn dim(&self) -> (usize, usize) {
        if self.width == 0 {
            (0, 0)
        } else {
            (self.width, self.data.len() / self.width)
        }
    }

    /// Pixel at coordinates. Row-major, no bounds adjustment.
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Set pixel at coordinates.
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.data[y * self.width + x] = value;
    }

    /// Pixels in row-major order.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Blur the frame with repeated clamped box passes.
    ///
    /// Suppresses sensor noise before differencing. A flat frame blurs to
    /// itself, so a static scene keeps producing a zero delta.
    pub fn blurred(&self) -> Self {
        let mut out = self.clone();
        let mut tmp = self.clone();
        for _ in 0..BLUR_PASSES {
            box_pass_horizontal(&out, &mut tmp);
            box_pass_vertical(&tmp, &mut out);
        }
        out
    }

    /// Absolute per-pixel difference against another frame of equal size.
    pub fn absdiff(&self, other: &Self) -> Self {
        debug_assert_eq!(self.dim(), other.dim());
        Self {
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(a, b)| a.abs_diff(*b))
                .collect(),
            width: self.width,
        }
    }
}

fn box_pass_horizontal(src: &GrayFrame, dst: &mut GrayFrame) {
    let (width, height) = src.dim();
    for y in 0..height {
        for x in 0..width {
            let lo = x.saturating_sub(BLUR_RADIUS);
            let hi = (x + BLUR_RADIUS).min(width.saturating_sub(1));
            let sum: u32 = (lo..=hi).map(|x| src.get(x, y) as u32).sum();
            let count = (hi - lo + 1) as u32;
            dst.set(x, y, ((sum + count / 2) / count) as u8);
        }
    }
}

fn box_pass_vertical(src: &GrayFrame, dst: &mut GrayFrame) {
    let (width, height) = src.dim();
    for y in 0..height {
        let lo = y.saturating_sub(BLUR_RADIUS);
        let hi = (y + BLUR_RADIUS).min(height.saturating_sub(1));
        let count = (hi - lo + 1) as u32;
        for x in 0..width {
            let sum: u32 = (lo..=hi).map(|y| src.get(x, y) as u32).sum();
            dst.set(x, y, ((sum + count / 2) / count) as u8);
        }
    }
}
