//! Pairwise Pearson correlation between channel planes.

use serde::Serialize;
use tracing::debug;

use crate::microscopy::common::Result;
use crate::microscopy::raster::ChannelPlane;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CorrelationStrength {
    Strong,
    Moderate,
    Weak,
    None,
}

impl CorrelationStrength {
    pub fn from_coefficient(r: f64) -> Self {
        let r = r.abs();
        if r > 0.8 {
            Self::Strong
        } else if r > 0.6 {
            Self::Moderate
        } else if r > 0.3 {
            Self::Weak
        } else {
            Self::None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationResult {
    pub channel1: usize,
    pub channel2: usize,
    pub pearson_correlation: f64,
    pub interpretation: CorrelationStrength,
}

/// Pearson r over all pixels. Zero variance in either plane gives `0.0`.
pub fn pearson_correlation(a: &ChannelPlane, b: &ChannelPlane) -> Result<f64> {
    a.ensure_same_dimensions(b)?;
    let n = a.len();
    if n == 0 {
        return Ok(0.0);
    }

    let (mut sum_x, mut sum_y) = (0u64, 0u64);
    for (&x, &y) in a.data().iter().zip(b.data()) {
        sum_x += x as u64;
        sum_y += y as u64;
    }
    let mean_x = sum_x as f64 / n as f64;
    let mean_y = sum_y as f64 / n as f64;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (&x, &y) in a.data().iter().zip(b.data()) {
        let dx = x as f64 - mean_x;
        let dy = y as f64 - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 {
        return Ok(0.0);
    }
    Ok(cov / denominator)
}

/// Correlates every pair `(i, j)` with `i < j` of the given planes, labelled
/// by the channel index each plane came from.
pub fn pairwise_correlations(planes: &[(usize, &ChannelPlane)]) -> Result<Vec<CorrelationResult>> {
    let mut results = Vec::with_capacity(planes.len() * planes.len().saturating_sub(1) / 2);
    for (i, &(channel1, a)) in planes.iter().enumerate() {
        for &(channel2, b) in &planes[i + 1..] {
            let r = pearson_correlation(a, b)?;
            debug!(channel1, channel2, r, "Channel correlation");
            results.push(CorrelationResult {
                channel1,
                channel2,
                pearson_correlation: r,
                interpretation: CorrelationStrength::from_coefficient(r),
            });
        }
    }
    Ok(results)
}
