//! Region segmentation
//!
//! Adaptive threshold, 8-connected flood-fill labelling, optional grayscale
//! opening, per-region shape metrics and a colored overlay mask. Model names
//! only select the threshold formula; no trained model runs here.

mod labeling;
mod metrics;
mod morphology;
mod pipeline;
mod threshold;
pub mod types;
mod visualize;


pub use labeling::{CONNECTIVITY_OFFSETS, label_regions};
pub use metrics::{compute_region_metrics, measure_regions};
pub use morphology::{dilate, erode, open};
pub use pipeline::{
    Cleaned, Labeled, MetricsComputed, Segmenter, Thresholded, Unprocessed, segment,
};
pub use threshold::{HistogramPercentiles, adaptive_threshold};
pub use types::{
    BoundingBox, CellposeParams, ImageDimensions, ModelParams, Point, Region, RegionMetrics,
    SecondOrderMoments, SegmentationMetadata, SegmentationModel, SegmentationRequest,
    SegmentationResult, StarDistParams, ThresholdParams, UNetParams,
};
pub use visualize::{GOLDEN_ANGLE_DEGREES, hsv_to_rgb, region_color, render_mask};
