//! Motion detection module

use crate::frame::GrayFrame;
use nalgebra as na;

/// Contour-style motion detector.
///
/// Binarizes a delta image at a fixed luminance `threshold`, dilates the
/// mask to merge fragmented regions into coherent blobs, then extracts
/// 8-connected components. Components smaller than `min_area` pixels are
/// treated as noise and discarded.
pub struct MotionDetector {
    threshold: u8,
    dilate_iterations: usize,
    min_area: usize,
}

impl Default for MotionDetector {
    fn default() -> Self {
        Self {
            threshold: 50,
            dilate_iterations: 1,
            min_area: 500,
        }
    }
}

/// Axis-aligned bounding geometry of one detected motion blob.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub struct Region {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    /// Pixel count of the component, not of the bounding rectangle.
    pub area: usize,
}

impl Region {
    /// Centre of the region in normalised `[0; 1]` frame coordinates.
    pub fn center(&self, frame_dim: (usize, usize)) -> na::Point2<f32> {
        let (fw, fh) = frame_dim;
        na::Point2::new(
            (self.x as f32 + self.width as f32 / 2.0) / fw.max(1) as f32,
            (self.y as f32 + self.height as f32 / 2.0) / fh.max(1) as f32,
        )
    }
}

/// Result of detection on a single delta image.
#[derive(Clone, Debug, Default)]
pub struct Detection {
    /// Surviving regions, in row-major discovery order.
    pub regions: Vec<Region>,
}

impl Detection {
    /// True iff at least one region survived the area filter.
    pub fn motion_observed(&self) -> bool {
        !self.regions.is_empty()
    }
}

impl MotionDetector {
    pub fn new(threshold: u8, dilate_iterations: usize, min_area: usize) -> Self {
        Self {
            threshold,
            dilate_iterations,
            min_area,
        }
    }

    /// Segment a delta image into motion regions.
    pub fn detect(&self, delta: &GrayFrame) -> Detection {
        let (width, height) = delta.dim();

        let mut map = vec![false; width * height];
        for y in 0..height {
            for x in 0..width {
                map[y * width + x] = delta.get(x, y) > self.threshold;
            }
        }

        for _ in 0..self.dilate_iterations {
            map = dilate(&map, width, height);
        }

        let mut regions = vec![];

        // Flood fill each connected component, measuring its pixel area
        // and bounding rectangle.
        for y in 0..height {
            for x in 0..width {
                if !map[y * width + x] {
                    continue;
                }

                let mut area = 0;
                let (mut min_x, mut min_y, mut max_x, mut max_y) = (x, y, x, y);

                map[y * width + x] = false;
                let mut to_fill = vec![(x, y); 1];

                while let Some((x, y)) = to_fill.pop() {
                    area += 1;
                    min_x = min_x.min(x);
                    min_y = min_y.min(y);
                    max_x = max_x.max(x);
                    max_y = max_y.max(y);

                    let neighbor_offs = (-1..=1).flat_map(|x| (-1..=1).map(move |y| (x, y)));

                    // Go through each neighbor and add any unvisited set
                    // entries.
                    for (x, y) in neighbor_offs
                        .map(|(ox, oy)| (x as isize + ox, y as isize + oy))
                        .filter(|&(ox, oy)| {
                            (0..width as isize).contains(&ox) && (0..height as isize).contains(&oy)
                        })
                        .map(|(x, y)| (x as usize, y as usize))
                    {
                        if map[y * width + x] {
                            to_fill.push((x, y));
                            map[y * width + x] = false;
                        }
                    }
                }

                // If the component is too small, ignore it.
                if area < self.min_area {
                    continue;
                }

                regions.push(Region {
                    x: min_x,
                    y: min_y,
                    width: max_x - min_x + 1,
                    height: max_y - min_y + 1,
                    area,
                });
            }
        }

        Detection { regions }
    }
}

/// Grow every set pixel into its 3x3 neighborhood.
fn dilate(map: &[bool], width: usize, height: usize) -> Vec<bool> {
    let mut out = vec![false; width * height];

    for y in 0..height {
        for x in 0..width {
            if !map[y * width + x] {
                continue;
            }

            for oy in -1..=1isize {
                for ox in -1..=1isize {
                    let (nx, ny) = (x as isize + ox, y as isize + oy);
                    if (0..width as isize).contains(&nx) && (0..height as isize).contains(&ny) {
                        out[ny as usize * width + nx as usize] = true;
                    }
                }
            }
        }
    }

    out
}
