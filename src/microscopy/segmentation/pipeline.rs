//! Segmentation stages
//!
//! `Unprocessed -> Thresholded -> Labeled -> Cleaned -> MetricsComputed`, then
//! `visualize` consumes the last stage into a [`SegmentationResult`]. Each
//! stage is its own type, so a step cannot be skipped or repeated.

use chrono::Utc;
use tracing::{debug, info, info_span, instrument};

use crate::microscopy::common::{Cancellation, Result};
use crate::microscopy::raster::ChannelPlane;
use crate::microscopy::segmentation::labeling::label_regions;
use crate::microscopy::segmentation::metrics::measure_regions;
use crate::microscopy::segmentation::morphology::open;
use crate::microscopy::segmentation::threshold::adaptive_threshold;
use crate::microscopy::segmentation::types::{
    ImageDimensions, Region, RegionMetrics, SegmentationMetadata, SegmentationModel,
    SegmentationRequest, SegmentationResult,
};
use crate::microscopy::segmentation::visualize::render_mask;

pub struct Unprocessed<'a> {
    plane: &'a ChannelPlane,
    request: SegmentationRequest,
}

pub struct Thresholded<'a> {
    plane: &'a ChannelPlane,
    request: SegmentationRequest,
    threshold: f64,
}

pub struct Labeled<'a> {
    plane: &'a ChannelPlane,
    request: SegmentationRequest,
    threshold: f64,
    regions: Vec<Region>,
}

pub struct Cleaned<'a> {
    plane: &'a ChannelPlane,
    request: SegmentationRequest,
    threshold: f64,
    regions: Vec<Region>,
}

pub struct MetricsComputed<'a> {
    plane: &'a ChannelPlane,
    request: SegmentationRequest,
    threshold: f64,
    regions: Vec<Region>,
    metrics: Vec<RegionMetrics>,
}

impl<'a> Unprocessed<'a> {
    pub fn new(plane: &'a ChannelPlane, request: SegmentationRequest) -> Result<Self> {
        request.validate()?;
        Ok(Self { plane, request })
    }

    pub fn threshold(self) -> Thresholded<'a> {
        let threshold = adaptive_threshold(self.plane, &self.request.params);
        debug!(model = %self.request.model(), threshold, "Adaptive threshold");
        Thresholded {
            plane: self.plane,
            request: self.request,
            threshold,
        }
    }
}

impl<'a> Thresholded<'a> {
    pub fn threshold_value(&self) -> f64 {
        self.threshold
    }

    pub fn label(self, cancel: &Cancellation) -> Result<Labeled<'a>> {
        let regions = label_regions(self.plane, self.threshold, self.request.min_size, cancel)?;
        Ok(Labeled {
            plane: self.plane,
            request: self.request,
            threshold: self.threshold,
            regions,
        })
    }
}

impl<'a> Labeled<'a> {
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Opening applies to the `threshold` model only. The labelled pixels are
    /// opened as a grayscale plane, clamped to the original foreground and
    /// labelled again with the same threshold and size filter.
    pub fn clean(self, cancel: &Cancellation) -> Result<Cleaned<'a>> {
        let regions = if self.request.model() == SegmentationModel::Threshold {
            let (width, height) = self.plane.dimensions();
            let mut foreground = ChannelPlane::filled(width, height, 0);
            {
                let src = self.plane.data();
                let dst = foreground.data_mut();
                for region in &self.regions {
                    for &i in &region.pixels {
                        dst[i] = src[i];
                    }
                }
            }
            let mut opened = open(&foreground, self.request.opening_kernel, cancel)?;
            // Clamp to the foreground: the unfiltered border strip would
            // otherwise spread inward during dilation.
            for (o, &f) in opened.data_mut().iter_mut().zip(foreground.data()) {
                *o = (*o).min(f);
            }
            let cleaned = label_regions(&opened, self.threshold, self.request.min_size, cancel)?;
            debug!(
                before = self.regions.len(),
                after = cleaned.len(),
                kernel = self.request.opening_kernel,
                "Morphological cleanup"
            );
            cleaned
        } else {
            self.regions
        };

        Ok(Cleaned {
            plane: self.plane,
            request: self.request,
            threshold: self.threshold,
            regions,
        })
    }
}

impl<'a> Cleaned<'a> {
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn measure(self) -> MetricsComputed<'a> {
        let metrics = measure_regions(&self.regions, self.plane.width(), self.plane.height());
        MetricsComputed {
            plane: self.plane,
            request: self.request,
            threshold: self.threshold,
            regions: self.regions,
            metrics,
        }
    }
}

impl MetricsComputed<'_> {
    pub fn metrics(&self) -> &[RegionMetrics] {
        &self.metrics
    }

    pub fn visualize(self) -> SegmentationResult {
        let (width, height) = self.plane.dimensions();
        let mask = render_mask(width, height, &self.regions);
        SegmentationResult {
            mask,
            metadata: SegmentationMetadata {
                model: self.request.model(),
                parameters: self.request,
                threshold: self.threshold,
                image_dimensions: ImageDimensions { width, height },
                total_cells: self.metrics.len(),
                timestamp: Utc::now(),
            },
            regions: self.metrics,
        }
    }
}

/// Runs every stage in order.
pub fn segment(
    plane: &ChannelPlane,
    request: &SegmentationRequest,
    cancel: &Cancellation,
) -> Result<SegmentationResult> {
    let unprocessed = Unprocessed::new(plane, *request)?;

    let thresholded = {
        let _span = info_span!("threshold").entered();
        unprocessed.threshold()
    };
    let labeled = {
        let _span = info_span!("label").entered();
        thresholded.label(cancel)?
    };
    let cleaned = {
        let _span = info_span!("cleanup").entered();
        labeled.clean(cancel)?
    };
    let measured = {
        let _span = info_span!("metrics", regions = cleaned.regions().len()).entered();
        cleaned.measure()
    };
    let _span = info_span!("visualize").entered();
    Ok(measured.visualize())
}

/// Segmentation front end holding a request and a cancellation handle.
pub struct Segmenter {
    request: SegmentationRequest,
    cancel: Cancellation,
}

impl Segmenter {
    pub fn new(request: SegmentationRequest) -> Self {
        Self {
            request,
            cancel: Cancellation::none(),
        }
    }

    /// Default parameters for the model named `id`.
    pub fn for_model(id: &str) -> Result<Self> {
        Ok(Self::new(SegmentationRequest::for_model(id)?))
    }

    pub fn with_cancellation(mut self, cancel: Cancellation) -> Self {
        self.cancel = cancel;
        self
    }

    #[instrument(skip(self, plane), fields(model = %self.request.model(), width = plane.width(), height = plane.height()))]
    pub fn segment(&self, plane: &ChannelPlane) -> Result<SegmentationResult> {
        let result = segment(plane, &self.request, &self.cancel)?;
        info!(
            total_cells = result.metadata.total_cells,
            threshold = result.metadata.threshold,
            "Segmentation complete"
        );
        Ok(result)
    }

    pub fn request(&self) -> &SegmentationRequest {
        &self.request
    }

    pub fn set_request(&mut self, request: SegmentationRequest) {
        self.request = request;
    }
}
