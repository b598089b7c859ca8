//! Segmentation request, region and result types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::microscopy::common::error::{AnalysisError, Result};
use crate::microscopy::raster::RgbaBuffer;

/// Minimum region area kept after labelling.
pub const DEFAULT_MIN_SIZE: usize = 50;

/// Side of the square opening window.
pub const DEFAULT_OPENING_KERNEL: usize = 3;

/// Selects the adaptive threshold formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentationModel {
    Cellpose,
    StarDist,
    Threshold,
    UNet,
}

impl SegmentationModel {
    pub fn id(&self) -> &'static str {
        match self {
            Self::Cellpose => "cellpose",
            Self::StarDist => "stardist",
            Self::Threshold => "threshold",
            Self::UNet => "unet",
        }
    }

    pub fn default_params(&self) -> ModelParams {
        match self {
            Self::Cellpose => ModelParams::Cellpose(CellposeParams::default()),
            Self::StarDist => ModelParams::StarDist(StarDistParams::default()),
            Self::Threshold => ModelParams::Threshold(ThresholdParams::default()),
            Self::UNet => ModelParams::UNet(UNetParams::default()),
        }
    }
}

impl fmt::Display for SegmentationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for SegmentationModel {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cellpose" => Ok(Self::Cellpose),
            "stardist" => Ok(Self::StarDist),
            "threshold" => Ok(Self::Threshold),
            "unet" | "u-net" => Ok(Self::UNet),
            _ => Err(AnalysisError::UnknownModel(s.to_string())),
        }
    }
}

/// Accepted for interface compatibility; has no effect on the result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CellposeParams {
    /// Expected cell diameter in pixels.
    pub diameter: f64,
    pub flow_threshold: f64,
    pub cellprob_threshold: f64,
}

impl Default for CellposeParams {
    fn default() -> Self {
        Self {
            diameter: 30.0,
            flow_threshold: 0.4,
            cellprob_threshold: 0.0,
        }
    }
}

/// Accepted for interface compatibility; has no effect on the result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StarDistParams {
    pub prob_threshold: f64,
    pub nms_threshold: f64,
}

impl Default for StarDistParams {
    fn default() -> Self {
        Self {
            prob_threshold: 0.5,
            nms_threshold: 0.4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThresholdParams {
    /// Cutoff as a fraction of full scale, multiplied by 255.
    pub threshold: f64,
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self { threshold: 0.5 }
    }
}

/// Accepted for interface compatibility; has no effect on the result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UNetParams {
    pub confidence: f64,
}

impl Default for UNetParams {
    fn default() -> Self {
        Self { confidence: 0.5 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "lowercase")]
pub enum ModelParams {
    Cellpose(CellposeParams),
    StarDist(StarDistParams),
    Threshold(ThresholdParams),
    UNet(UNetParams),
}

impl ModelParams {
    pub fn model(&self) -> SegmentationModel {
        match self {
            Self::Cellpose(_) => SegmentationModel::Cellpose,
            Self::StarDist(_) => SegmentationModel::StarDist,
            Self::Threshold(_) => SegmentationModel::Threshold,
            Self::UNet(_) => SegmentationModel::UNet,
        }
    }
}

/// Everything one segmentation run needs besides the plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationRequest {
    pub params: ModelParams,
    #[serde(default = "default_min_size")]
    pub min_size: usize,
    #[serde(default = "default_opening_kernel")]
    pub opening_kernel: usize,
}

fn default_min_size() -> usize {
    DEFAULT_MIN_SIZE
}

fn default_opening_kernel() -> usize {
    DEFAULT_OPENING_KERNEL
}

impl SegmentationRequest {
    pub fn new(params: ModelParams) -> Self {
        Self {
            params,
            min_size: DEFAULT_MIN_SIZE,
            opening_kernel: DEFAULT_OPENING_KERNEL,
        }
    }

    /// Default parameters for the model named `id`.
    pub fn for_model(id: &str) -> Result<Self> {
        let model: SegmentationModel = id.parse()?;
        Ok(Self::new(model.default_params()))
    }

    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn with_opening_kernel(mut self, kernel: usize) -> Self {
        self.opening_kernel = kernel;
        self
    }

    pub fn model(&self) -> SegmentationModel {
        self.params.model()
    }

    pub fn validate(&self) -> Result<()> {
        if self.opening_kernel == 0 || self.opening_kernel % 2 == 0 {
            return Err(AnalysisError::InvalidKernel(self.opening_kernel));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// `width` and `height` are `max - min`, so a single pixel has a 0x0 box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl BoundingBox {
    /// Number of pixel columns and rows the box covers.
    pub fn pixel_span(&self) -> (usize, usize) {
        (self.width + 1, self.height + 1)
    }
}

/// One connected component as produced by labelling.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub id: usize,
    /// Flat `y * width + x` indices.
    pub pixels: Vec<usize>,
    pub centroid: Point,
    pub bounding_box: BoundingBox,
    pub total_intensity: u64,
}

impl Region {
    pub fn area(&self) -> usize {
        self.pixels.len()
    }

    pub fn mean_intensity(&self) -> f64 {
        if self.pixels.is_empty() {
            0.0
        } else {
            self.total_intensity as f64 / self.pixels.len() as f64
        }
    }
}

/// Central second-order moments divided by area, plus the first two Hu-style
/// combinations. None of these are scale normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SecondOrderMoments {
    pub m20: f64,
    pub m02: f64,
    pub m11: f64,
    pub hu1: f64,
    pub hu2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionMetrics {
    pub id: usize,
    pub area: usize,
    pub perimeter: usize,
    pub circularity: f64,
    pub centroid: Point,
    pub bounding_box: BoundingBox,
    pub mean_intensity: f64,
    pub aspect_ratio: f64,
    pub extent: f64,
    pub moments: SecondOrderMoments,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageDimensions {
    pub width: usize,
    pub height: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationMetadata {
    pub model: SegmentationModel,
    pub parameters: SegmentationRequest,
    /// Threshold the plane was cut at, in 8-bit intensity units.
    pub threshold: f64,
    pub image_dimensions: ImageDimensions,
    pub total_cells: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SegmentationResult {
    pub mask: RgbaBuffer,
    pub regions: Vec<RegionMetrics>,
    pub metadata: SegmentationMetadata,
}
