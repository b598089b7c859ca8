//! Coarse image-quality heuristics on a grayscale plane.
//!
//! Both scores use fixed thresholds and are meant as a quick sanity signal,
//! not a calibrated QC metric.

use serde::Serialize;

use crate::microscopy::raster::ChannelPlane;
use crate::microscopy::statistics::EPSILON;

/// Default number of background samples for the uniformity score.
pub const DEFAULT_UNIFORMITY_SAMPLES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QualityRating {
    Excellent,
    Good,
    Moderate,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityScore {
    pub score: f64,
    pub rating: QualityRating,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    pub focus: QualityScore,
    pub background_uniformity: QualityScore,
}

/// Mean of `(p[i+1] - p[i-1])^2` over the flattened buffer.
pub fn focus_score(plane: &ChannelPlane) -> QualityScore {
    let data = plane.data();
    let score = if data.len() < 3 {
        0.0
    } else {
        let sum: f64 = data
            .windows(3)
            .map(|w| {
                let d = w[2] as f64 - w[0] as f64;
                d * d
            })
            .sum();
        sum / data.len() as f64
    };

    let rating = if score > 1000.0 {
        QualityRating::Excellent
    } else if score > 500.0 {
        QualityRating::Good
    } else if score > 100.0 {
        QualityRating::Moderate
    } else {
        QualityRating::Poor
    };
    QualityScore { score, rating }
}

/// Coefficient of variation of up to `samples` pixels spread over the whole
/// plane.
pub fn background_uniformity(plane: &ChannelPlane, samples: usize) -> QualityScore {
    let score = if plane.is_empty() || samples == 0 {
        0.0
    } else {
        let values: Vec<f64> = plane.strided_samples(samples).map(f64::from).collect();
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        variance.sqrt() / (mean + EPSILON)
    };

    let rating = if score < 0.1 {
        QualityRating::Excellent
    } else if score < 0.2 {
        QualityRating::Good
    } else if score < 0.3 {
        QualityRating::Moderate
    } else {
        QualityRating::Poor
    };
    QualityScore { score, rating }
}

pub fn assess_quality(plane: &ChannelPlane, uniformity_samples: usize) -> QualityMetrics {
    QualityMetrics {
        focus: focus_score(plane),
        background_uniformity: background_uniformity(plane, uniformity_samples),
    }
}
