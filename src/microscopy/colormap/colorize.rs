use tracing::debug;

use crate::microscopy::colormap::catalog::ColorSpec;
use crate::microscopy::colormap::types::validate_contrast;
use crate::microscopy::common::{Cancellation, Result};
use crate::microscopy::raster::{ChannelPlane, RgbaBuffer};

/// Default number of pixels sampled when estimating the background level.
pub const DEFAULT_SAMPLE_LIMIT: usize = 10_000;

/// Default background percentile.
pub const DEFAULT_BACKGROUND_PERCENTILE: f64 = 0.25;

/// Value at `percentile` of up to `sample_limit` samples spread over the
/// whole plane.
///
/// Returns 0 for an empty plane.
pub fn background_threshold(plane: &ChannelPlane, sample_limit: usize, percentile: f64) -> u8 {
    if plane.is_empty() || sample_limit == 0 {
        return 0;
    }

    let mut samples: Vec<u8> = plane.strided_samples(sample_limit).collect();
    samples.sort_unstable();

    let index = ((samples.len() as f64 * percentile.clamp(0.0, 1.0)) as usize).min(samples.len() - 1);
    samples[index]
}

/// Maps one channel plane to an RGBA layer tinted with a catalog color.
#[derive(Debug, Clone, Copy)]
pub struct Colorizer {
    pub sample_limit: usize,
    pub background_percentile: f64,
}

impl Default for Colorizer {
    fn default() -> Self {
        Self {
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            background_percentile: DEFAULT_BACKGROUND_PERCENTILE,
        }
    }
}

impl Colorizer {
    pub fn new(sample_limit: usize, background_percentile: f64) -> Self {
        Self {
            sample_limit,
            background_percentile,
        }
    }

    /// Pixels at or below the plane's background level, and pixels whose
    /// contrast-adjusted color is black, come out fully transparent.
    pub fn colorize(
        &self,
        plane: &ChannelPlane,
        color: &ColorSpec,
        contrast: u32,
        cancel: &Cancellation,
    ) -> Result<RgbaBuffer> {
        validate_contrast(contrast)?;

        let threshold = background_threshold(plane, self.sample_limit, self.background_percentile);
        debug!(
            color = color.name,
            contrast,
            threshold,
            "Colorizing channel plane"
        );

        let lut = color_lut(color, threshold, contrast);
        let (width, height) = plane.dimensions();
        let mut output = RgbaBuffer::transparent(width, height);
        let out = output.data_mut();

        for y in 0..height {
            cancel.check()?;
            let row = plane.row(y);
            let base = y * width * 4;
            for (x, &value) in row.iter().enumerate() {
                let i = base + x * 4;
                out[i..i + 4].copy_from_slice(&lut[value as usize]);
            }
        }

        Ok(output)
    }
}

/// Output for every possible 8-bit input value.
fn color_lut(color: &ColorSpec, threshold: u8, contrast: u32) -> [[u8; 4]; 256] {
    let factor = contrast as f64 / 100.0;
    let mut lut = [[0u8; 4]; 256];
    for (value, entry) in lut.iter_mut().enumerate() {
        if value <= threshold as usize {
            continue;
        }
        let intensity = value as f64 / 255.0;
        let adjusted = ((intensity - 0.5) * factor + 0.5).clamp(0.0, 1.0);
        let r = (adjusted * color.rgb[0] as f64).round() as u8;
        let g = (adjusted * color.rgb[1] as f64).round() as u8;
        let b = (adjusted * color.rgb[2] as f64).round() as u8;
        if r == 0 && g == 0 && b == 0 {
            continue;
        }
        *entry = [r, g, b, 255];
    }
    lut
}
