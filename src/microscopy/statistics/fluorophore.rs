//! Rough guess at the kind of stain behind a channel.
//!
//! Fixed thresholds on the intensity distribution shape. Not a validated
//! classifier: confidences stay low on purpose and the reasoning string lists
//! the numbers the decision was based on.

use serde::Serialize;

use crate::microscopy::statistics::moments::ChannelStatistics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FluorophoreType {
    Nuclear,
    Cytoplasmic,
    Punctate,
    Filamentous,
    Background,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FluorophoreGuess {
    #[serde(rename = "type")]
    pub kind: FluorophoreType,
    pub confidence: f64,
    pub reasoning: String,
}

pub fn classify_fluorophore(stats: &ChannelStatistics) -> FluorophoreGuess {
    let summary = format!(
        "mean={:.1}, stddev={:.1}, skewness={:.2}, kurtosis={:.2}",
        stats.mean, stats.std_dev, stats.skewness, stats.kurtosis
    );

    let (kind, confidence, why) = if stats.mean < 5.0 && stats.std_dev < 5.0 {
        (FluorophoreType::Background, 0.3, "almost no signal above zero")
    } else if stats.skewness > 2.0 && stats.kurtosis > 5.0 {
        (
            FluorophoreType::Punctate,
            0.45,
            "heavy right tail with sharp peaks suggests small bright puncta",
        )
    } else if stats.skewness > 1.0 && stats.mean < 60.0 {
        (
            FluorophoreType::Nuclear,
            0.4,
            "dim background with compact bright regions suggests a nuclear stain",
        )
    } else if stats.std_dev > 60.0 {
        (
            FluorophoreType::Filamentous,
            0.35,
            "wide intensity spread suggests structured or filamentous labelling",
        )
    } else if stats.mean > 80.0 && stats.std_dev < 40.0 {
        (
            FluorophoreType::Cytoplasmic,
            0.35,
            "bright and even signal suggests a diffuse cytoplasmic stain",
        )
    } else {
        (FluorophoreType::Unknown, 0.1, "distribution matches no bucket")
    };

    FluorophoreGuess {
        kind,
        confidence,
        reasoning: format!("{} ({})", why, summary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::microscopy::raster::ChannelPlane;
    use crate::microscopy::statistics::compute_statistics;

    #[test]
    fn test_empty_channel_is_background() {
        let stats = compute_statistics(&ChannelPlane::filled(8, 8, 0));
        let guess = classify_fluorophore(&stats);
        assert_eq!(guess.kind, FluorophoreType::Background);
        assert!(guess.confidence < 0.5);
    }

    #[test]
    fn test_sparse_bright_spots_are_punctate() {
        let mut data = vec![5u8; 400];
        for i in (0..400).step_by(50) {
            data[i] = 250;
        }
        let stats = compute_statistics(&ChannelPlane::new(20, 20, data).unwrap());
        assert_eq!(classify_fluorophore(&stats).kind, FluorophoreType::Punctate);
    }

    #[test]
    fn test_even_bright_is_cytoplasmic() {
        let data: Vec<u8> = (0..100).map(|i| 120 + (i % 10) as u8).collect();
        let stats = compute_statistics(&ChannelPlane::new(10, 10, data).unwrap());
        let guess = classify_fluorophore(&stats);
        assert_eq!(guess.kind, FluorophoreType::Cytoplasmic);
        assert!(guess.reasoning.contains("mean="));
    }

    #[test]
    fn test_serializes_type_field() {
        let stats = compute_statistics(&ChannelPlane::filled(2, 2, 0));
        let json = serde_json::to_value(classify_fluorophore(&stats)).unwrap();
        assert_eq!(json["type"], "background");
    }
}
