use std::f64::consts::PI;

use crate::microscopy::segmentation::types::{Region, RegionMetrics, SecondOrderMoments};

const FOUR_NEIGHBORS: [(isize, isize); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

/// Shape metrics for one region of an image `width` x `height`.
///
/// `labels` holds the region id of every pixel (0 for background) and is used
/// for the perimeter count.
pub fn compute_region_metrics(
    region: &Region,
    labels: &[usize],
    width: usize,
    height: usize,
) -> RegionMetrics {
    let area = region.area();

    // Pixel edges facing a non-member 4-neighbour or the image border.
    let mut perimeter = 0usize;
    for &i in &region.pixels {
        let x = (i % width) as isize;
        let y = (i / width) as isize;
        for (dx, dy) in FOUR_NEIGHBORS {
            let nx = x + dx;
            let ny = y + dy;
            let outside = nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize;
            if outside || labels[ny as usize * width + nx as usize] != region.id {
                perimeter += 1;
            }
        }
    }

    let circularity = if perimeter > 0 {
        4.0 * PI * area as f64 / (perimeter * perimeter) as f64
    } else {
        0.0
    };

    let (cx, cy) = (region.centroid.x, region.centroid.y);
    let (mut m20, mut m02, mut m11) = (0.0, 0.0, 0.0);
    for &i in &region.pixels {
        let dx = (i % width) as f64 - cx;
        let dy = (i / width) as f64 - cy;
        m20 += dx * dx;
        m02 += dy * dy;
        m11 += dx * dy;
    }
    if area > 0 {
        let n = area as f64;
        m20 /= n;
        m02 /= n;
        m11 /= n;
    }

    let (span_w, span_h) = region.bounding_box.pixel_span();

    RegionMetrics {
        id: region.id,
        area,
        perimeter,
        circularity,
        centroid: region.centroid,
        bounding_box: region.bounding_box,
        mean_intensity: region.mean_intensity(),
        aspect_ratio: span_w as f64 / span_h as f64,
        extent: area as f64 / (span_w * span_h) as f64,
        moments: SecondOrderMoments {
            m20,
            m02,
            m11,
            hu1: m20 + m02,
            hu2: (m20 - m02).powi(2) + 4.0 * m11 * m11,
        },
    }
}

/// Metrics for every region, in region order.
pub fn measure_regions(regions: &[Region], width: usize, height: usize) -> Vec<RegionMetrics> {
    let mut labels = vec![0usize; width * height];
    for region in regions {
        for &i in &region.pixels {
            labels[i] = region.id;
        }
    }
    regions
        .iter()
        .map(|r| compute_region_metrics(r, &labels, width, height))
        .collect()
}
