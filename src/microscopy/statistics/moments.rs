use serde::Serialize;

use crate::microscopy::raster::ChannelPlane;

/// Guards the SNR and CV divisions.
pub const EPSILON: f64 = 0.001;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatistics {
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
    /// Third standardized moment.
    pub skewness: f64,
    /// Excess kurtosis (normal = 0).
    pub kurtosis: f64,
    pub min: u8,
    pub max: u8,
    pub histogram: Vec<u32>,
    pub signal_to_noise: f64,
    pub dynamic_range: u8,
    pub coefficient_of_variation: f64,
}

/// Population statistics of one plane.
///
/// An empty plane yields all-zero statistics. A constant plane yields zero
/// skewness and kurtosis.
pub fn compute_statistics(plane: &ChannelPlane) -> ChannelStatistics {
    let data = plane.data();
    let mut histogram = vec![0u32; 256];
    for &v in data {
        histogram[v as usize] += 1;
    }

    let n = data.len() as f64;
    if data.is_empty() {
        return ChannelStatistics {
            mean: 0.0,
            variance: 0.0,
            std_dev: 0.0,
            skewness: 0.0,
            kurtosis: 0.0,
            min: 0,
            max: 0,
            histogram,
            signal_to_noise: 0.0,
            dynamic_range: 0,
            coefficient_of_variation: 0.0,
        };
    }

    // Everything below works off the histogram: 256 bins instead of N pixels.
    let min = histogram.iter().position(|&c| c > 0).unwrap_or(0) as u8;
    let max = histogram.iter().rposition(|&c| c > 0).unwrap_or(0) as u8;

    let mean = histogram
        .iter()
        .enumerate()
        .map(|(v, &c)| v as f64 * c as f64)
        .sum::<f64>()
        / n;

    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for (v, &c) in histogram.iter().enumerate() {
        if c == 0 {
            continue;
        }
        let d = v as f64 - mean;
        let d2 = d * d;
        m2 += d2 * c as f64;
        m3 += d2 * d * c as f64;
        m4 += d2 * d2 * c as f64;
    }
    m2 /= n;
    m3 /= n;
    m4 /= n;

    let variance = m2;
    let std_dev = variance.sqrt();
    let (skewness, kurtosis) = if variance > 0.0 {
        (m3 / variance.powf(1.5), m4 / (variance * variance) - 3.0)
    } else {
        (0.0, 0.0)
    };

    ChannelStatistics {
        mean,
        variance,
        std_dev,
        skewness,
        kurtosis,
        min,
        max,
        histogram,
        signal_to_noise: mean / (std_dev + EPSILON),
        dynamic_range: max - min,
        coefficient_of_variation: std_dev / (mean + EPSILON),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_plane() {
        let stats = compute_statistics(&ChannelPlane::filled(16, 16, 42));
        assert_eq!(stats.mean, 42.0);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.coefficient_of_variation, 0.0);
        assert_eq!(stats.skewness, 0.0);
        assert_eq!(stats.kurtosis, 0.0);
        assert_eq!(stats.dynamic_range, 0);
        assert_eq!(stats.histogram[42], 256);
        assert!((stats.signal_to_noise - 42_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_plane_has_no_nan() {
        let stats = compute_statistics(&ChannelPlane::filled(4, 4, 0));
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.signal_to_noise, 0.0);
        assert_eq!(stats.coefficient_of_variation, 0.0);
    }

    #[test]
    fn test_two_level_plane() {
        let plane = ChannelPlane::new(4, 1, vec![0, 0, 100, 100]).unwrap();
        let stats = compute_statistics(&plane);
        assert_eq!(stats.mean, 50.0);
        assert_eq!(stats.variance, 2500.0);
        assert_eq!(stats.std_dev, 50.0);
        assert!(stats.skewness.abs() < 1e-12);
        // Symmetric two-point distribution has excess kurtosis -2.
        assert!((stats.kurtosis + 2.0).abs() < 1e-12);
        assert_eq!(stats.min, 0);
        assert_eq!(stats.max, 100);
        assert_eq!(stats.dynamic_range, 100);
    }

    #[test]
    fn test_right_tail_is_positive_skew() {
        let mut data = vec![10u8; 99];
        data.push(250);
        let plane = ChannelPlane::new(10, 10, data).unwrap();
        assert!(compute_statistics(&plane).skewness > 5.0);
    }

    #[test]
    fn test_empty_plane() {
        let plane = ChannelPlane::new(0, 0, Vec::new()).unwrap();
        let stats = compute_statistics(&plane);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.histogram.len(), 256);
    }
}
