use serde::Serialize;

use crate::microscopy::raster::ChannelPlane;
use crate::microscopy::segmentation::types::ModelParams;

/// Quartiles read off the 256-bin intensity histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistogramPercentiles {
    pub p25: u8,
    pub median: u8,
    pub p75: u8,
}

impl HistogramPercentiles {
    pub fn from_plane(plane: &ChannelPlane) -> Self {
        let mut histogram = [0u64; 256];
        for &v in plane.data() {
            histogram[v as usize] += 1;
        }
        let total = plane.len() as u64;
        Self {
            p25: percentile(&histogram, total, 0.25),
            median: percentile(&histogram, total, 0.50),
            p75: percentile(&histogram, total, 0.75),
        }
    }
}

/// Smallest value whose cumulative count reaches `fraction` of `total`.
fn percentile(histogram: &[u64; 256], total: u64, fraction: f64) -> u8 {
    if total == 0 {
        return 0;
    }
    let target = ((total as f64 * fraction).ceil() as u64).max(1);
    let mut cumulative = 0u64;
    for (value, &count) in histogram.iter().enumerate() {
        cumulative += count;
        if cumulative >= target {
            return value as u8;
        }
    }
    255
}

/// Per-model cutoff in 8-bit intensity units. Pixels strictly above it are
/// foreground.
///
/// The median-based factors are uncalibrated placeholders.
pub fn adaptive_threshold(plane: &ChannelPlane, params: &ModelParams) -> f64 {
    let q = HistogramPercentiles::from_plane(plane);
    let median = q.median as f64;
    match params {
        ModelParams::Cellpose(_) => median + (q.p75 as f64 - q.p25 as f64) * 0.3,
        ModelParams::StarDist(_) => median * 0.8,
        ModelParams::Threshold(p) => p.threshold * 255.0,
        ModelParams::UNet(_) => median * 0.7,
    }
}
