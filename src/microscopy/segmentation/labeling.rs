use tracing::debug;

use crate::microscopy::common::{Cancellation, Result};
use crate::microscopy::raster::ChannelPlane;
use crate::microscopy::segmentation::types::{BoundingBox, Point, Region};

/// 8-connected neighbourhood.
pub const CONNECTIVITY_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// One bit per pixel, indexed by `y * width + x`.
struct VisitedMap {
    words: Vec<u64>,
}

impl VisitedMap {
    fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(64)],
        }
    }

    /// Marks `index` and reports whether it was already marked.
    fn test_and_set(&mut self, index: usize) -> bool {
        let word = &mut self.words[index / 64];
        let bit = 1u64 << (index % 64);
        let was_set = *word & bit != 0;
        *word |= bit;
        was_set
    }
}

/// Labels connected components of pixels strictly above `threshold`.
///
/// Seeds are taken in raster order and grown with an explicit stack, so a
/// region as large as the whole image never recurses. Components with fewer
/// than `min_size` pixels are dropped; kept regions are numbered from 1 in
/// discovery order.
pub fn label_regions(
    plane: &ChannelPlane,
    threshold: f64,
    min_size: usize,
    cancel: &Cancellation,
) -> Result<Vec<Region>> {
    let (width, height) = plane.dimensions();
    let data = plane.data();
    let mut visited = VisitedMap::new(data.len());
    let mut stack: Vec<usize> = Vec::new();
    let mut regions = Vec::new();
    let mut discarded = 0usize;

    let is_foreground = |i: usize| data[i] as f64 > threshold;

    for y in 0..height {
        cancel.check()?;
        for x in 0..width {
            let seed = y * width + x;
            if !is_foreground(seed) || visited.test_and_set(seed) {
                continue;
            }

            let mut pixels = Vec::new();
            let (mut min_x, mut min_y, mut max_x, mut max_y) = (x, y, x, y);
            let (mut sum_x, mut sum_y) = (0u64, 0u64);
            let mut total_intensity = 0u64;

            stack.push(seed);
            while let Some(current) = stack.pop() {
                let cx = current % width;
                let cy = current / width;
                pixels.push(current);
                min_x = min_x.min(cx);
                max_x = max_x.max(cx);
                min_y = min_y.min(cy);
                max_y = max_y.max(cy);
                sum_x += cx as u64;
                sum_y += cy as u64;
                total_intensity += data[current] as u64;

                for (dx, dy) in CONNECTIVITY_OFFSETS {
                    let nx = cx as isize + dx;
                    let ny = cy as isize + dy;
                    if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                        continue;
                    }
                    let neighbor = ny as usize * width + nx as usize;
                    if is_foreground(neighbor) && !visited.test_and_set(neighbor) {
                        stack.push(neighbor);
                    }
                }
            }

            if pixels.len() < min_size {
                discarded += 1;
                continue;
            }

            let area = pixels.len() as f64;
            regions.push(Region {
                id: regions.len() + 1,
                centroid: Point {
                    x: sum_x as f64 / area,
                    y: sum_y as f64 / area,
                },
                bounding_box: BoundingBox {
                    x: min_x,
                    y: min_y,
                    width: max_x - min_x,
                    height: max_y - min_y,
                },
                pixels,
                total_intensity,
            });
        }
    }

    debug!(
        threshold,
        min_size,
        kept = regions.len(),
        discarded,
        "Labelled connected components"
    );
    Ok(regions)
}
