use serde::Serialize;

use crate::microscopy::colocalization::CorrelationResult;
use crate::microscopy::colormap::ColorSpec;
use crate::microscopy::io::RgbaWriteConfig;
use crate::microscopy::quality::QualityMetrics;
use crate::microscopy::raster::RgbaBuffer;
use crate::microscopy::statistics::{ChannelStatistics, FluorophoreGuess};

/// Configuration for multi-channel analysis
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Pixels sampled per channel when estimating the background level
    pub threshold_sample_limit: usize,
    /// Fraction of sampled pixels treated as background (0.25 = 25th percentile)
    pub background_percentile: f64,
    /// Pixels sampled for the background uniformity score
    pub uniformity_sample_count: usize,
    /// Whether to reject empty or oversized rasters before processing
    pub validate_dimensions: bool,
    pub max_dimension: Option<usize>,
    /// Minimum area of a region counted in the cellular metrics
    pub cellular_min_size: usize,
    /// Output encoding used by `analyze_file`
    pub output: RgbaWriteConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threshold_sample_limit: 10_000,
            background_percentile: 0.25,
            uniformity_sample_count: 100,
            validate_dimensions: true,
            max_dimension: Some(50_000),
            cellular_min_size: 50,
            output: RgbaWriteConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }
}

/// Builder for AnalysisConfig
#[derive(Default)]
pub struct AnalysisConfigBuilder {
    threshold_sample_limit: Option<usize>,
    background_percentile: Option<f64>,
    uniformity_sample_count: Option<usize>,
    validate_dimensions: Option<bool>,
    max_dimension: Option<Option<usize>>,
    cellular_min_size: Option<usize>,
    output: Option<RgbaWriteConfig>,
}

impl AnalysisConfigBuilder {
    pub fn threshold_sample_limit(mut self, limit: usize) -> Self {
        self.threshold_sample_limit = Some(limit);
        self
    }

    pub fn background_percentile(mut self, percentile: f64) -> Self {
        self.background_percentile = Some(percentile);
        self
    }

    pub fn uniformity_sample_count(mut self, count: usize) -> Self {
        self.uniformity_sample_count = Some(count);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn max_dimension(mut self, max: Option<usize>) -> Self {
        self.max_dimension = Some(max);
        self
    }

    pub fn cellular_min_size(mut self, min_size: usize) -> Self {
        self.cellular_min_size = Some(min_size);
        self
    }

    pub fn output(mut self, output: RgbaWriteConfig) -> Self {
        self.output = Some(output);
        self
    }

    pub fn build(self) -> AnalysisConfig {
        let default = AnalysisConfig::default();
        AnalysisConfig {
            threshold_sample_limit: self.threshold_sample_limit.unwrap_or(default.threshold_sample_limit),
            background_percentile: self.background_percentile.unwrap_or(default.background_percentile),
            uniformity_sample_count: self.uniformity_sample_count.unwrap_or(default.uniformity_sample_count),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
            max_dimension: self.max_dimension.unwrap_or(default.max_dimension),
            cellular_min_size: self.cellular_min_size.unwrap_or(default.cellular_min_size),
            output: self.output.unwrap_or(default.output),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelReport {
    pub channel_index: usize,
    pub fluorophore: FluorophoreGuess,
    pub statistics: ChannelStatistics,
    pub color_applied: ColorSpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellularMetrics {
    pub estimated_cell_count: usize,
    pub average_cell_area: f64,
    pub average_circularity: f64,
    /// Labelled pixels over total pixels.
    pub coverage_fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub channels: Vec<ChannelReport>,
    pub channel_correlations: Vec<CorrelationResult>,
    pub cellular_metrics: CellularMetrics,
    pub quality_metrics: QualityMetrics,
}

#[derive(Debug, Clone)]
pub struct CompositedImage {
    pub image: RgbaBuffer,
    pub analysis: AnalysisReport,
}
