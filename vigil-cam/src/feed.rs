//! Terminal feed rendering
//!
//! Maps the delta image onto an ASCII brightness ramp scaled to the
//! terminal, with optional region overlays and status/time stamp lines.
//! This is the display layer; the core pipeline never renders anything.

use chrono::Local;
use terminal_size::{terminal_size, Height, Width};
use vigil::prelude::v1::*;

const CHAR_MAP: &str = "$@B%8&WM#*oahkbdpqwmZO0QLCJUYXzcvunxrjft/\\|()1{}[]?-_+~<>i!lI;:,\"^`'. ";

/// Rows kept free under the image for the stamp lines.
const RESERVED_ROWS: usize = 3;

fn delta_to_char(delta: u8) -> char {
    let range = delta as f32 / 255.0;
    let idx = (1f32 - range) * (CHAR_MAP.len() - 1) as f32;
    CHAR_MAP.chars().nth(idx.round() as usize).unwrap()
}

pub struct Feed {
    bounding_boxes: bool,
    occupation_stamp: bool,
    time_stamp: bool,
    grid: (usize, usize),
}

impl Feed {
    pub fn new(config: &CameraConfig) -> Self {
        let grid = if let Some((Width(w), Height(h))) = terminal_size() {
            (
                (w as usize).max(1),
                (h as usize).saturating_sub(RESERVED_ROWS).max(1),
            )
        } else {
            (80, 30)
        };

        Self {
            bounding_boxes: config.bounding_boxes,
            occupation_stamp: config.occupation_stamp,
            time_stamp: config.time_stamp,
            grid,
        }
    }

    /// Print one frame report to stdout.
    pub fn render(&self, report: &FrameReport, frame_dim: (usize, usize)) {
        let (gw, gh) = self.grid;

        if let Some(delta) = &report.delta {
            let mut cells = downsample(delta, gw, gh);

            if self.bounding_boxes {
                for region in &report.regions {
                    draw_region(&mut cells, (gw, gh), region, frame_dim);
                }
            }

            for row in cells.chunks(gw) {
                println!("{}", row.iter().collect::<String>());
            }
        }

        if self.occupation_stamp {
            println!("Room Status: {}", report.status.label());
        }
        if self.time_stamp {
            println!("{}", Local::now().format("%A %d %B %Y %I:%M:%S%p"));
        }
    }
}

/// Shrink the delta onto the character grid, keeping the brightest pixel of
/// each cell so small motion stays visible.
fn downsample(delta: &GrayFrame, gw: usize, gh: usize) -> Vec<char> {
    let (fw, fh) = delta.dim();
    let mut cells = vec![' '; gw * gh];

    if fw == 0 || fh == 0 {
        return cells;
    }

    for cy in 0..gh {
        let y0 = cy * fh / gh;
        let y1 = ((cy + 1) * fh / gh).max(y0 + 1).min(fh);
        for cx in 0..gw {
            let x0 = cx * fw / gw;
            let x1 = ((cx + 1) * fw / gw).max(x0 + 1).min(fw);

            let mut brightest = 0;
            for y in y0..y1 {
                for x in x0..x1 {
                    brightest = brightest.max(delta.get(x, y));
                }
            }
            cells[cy * gw + cx] = delta_to_char(brightest);
        }
    }

    cells
}

/// Overlay one region as a rectangle outline plus a centre marker.
fn draw_region(cells: &mut [char], (gw, gh): (usize, usize), region: &Region, frame_dim: (usize, usize)) {
    let (fw, fh) = frame_dim;
    if fw == 0 || fh == 0 {
        return;
    }

    let x0 = (region.x * gw / fw).min(gw - 1);
    let y0 = (region.y * gh / fh).min(gh - 1);
    let x1 = ((region.x + region.width) * gw / fw).min(gw - 1);
    let y1 = ((region.y + region.height) * gh / fh).min(gh - 1);

    for x in x0..=x1 {
        cells[y0 * gw + x] = '#';
        cells[y1 * gw + x] = '#';
    }
    for y in y0..=y1 {
        cells[y * gw + x0] = '#';
        cells[y * gw + x1] = '#';
    }

    let center = region.center(frame_dim);
    let cx = ((center.x * gw as f32) as usize).min(gw - 1);
    let cy = ((center.y * gh as f32) as usize).min(gh - 1);
    cells[cy * gw + cx] = '+';
}
