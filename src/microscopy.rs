//! Fluorescence microscopy analysis engine
//!
//! Multi-channel rasters are split into single-channel planes, tinted with
//! catalog fluorophore colors and composited. Alongside the composite the
//! engine reports per-channel statistics, pairwise colocalization, a region
//! segmentation and two image-quality scores.

pub mod analysis;
pub mod colocalization;
pub mod colormap;
pub mod common;
pub mod io;
pub mod quality;
pub mod raster;
pub mod segmentation;
pub mod statistics;

pub use common::{AnalysisError, Cancellation, Result};

pub use raster::{ChannelPlane, RasterBuffer, RgbaBuffer};

pub use colormap::{ChannelAdjustment, ColorCatalog, ColorSpec, Colorizer};

pub use io::{RasterReader, RgbaWriteConfig, RgbaWriter, TiffCompression, TiffRasterReader, TiffRgbaWriter};

pub use segmentation::{SegmentationModel, SegmentationRequest, SegmentationResult, Segmenter};

pub use analysis::{AnalysisConfig, AnalysisReport, ChannelAnalysisPipeline, CompositedImage};
