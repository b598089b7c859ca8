use std::io::Write;
use std::path::Path;

use tracing::{debug, info, info_span, instrument, warn};

use crate::microscopy::analysis::types::{
    AnalysisConfig, AnalysisReport, CellularMetrics, ChannelReport, CompositedImage,
};
use crate::microscopy::colocalization::pairwise_correlations;
use crate::microscopy::colormap::{
    ChannelAdjustment, ColorCatalog, ColorSpec, Colorizer, CompositeAccumulator, MAX_COMPOSITE_LAYERS,
};
use crate::microscopy::common::{AnalysisError, Cancellation, Result};
use crate::microscopy::io::{RasterReader, RgbaWriter, TiffRasterReader, TiffRgbaWriter};
use crate::microscopy::quality::assess_quality;
use crate::microscopy::raster::{ChannelPlane, RasterBuffer, extract_channel, grayscale_plane};
use crate::microscopy::segmentation::{
    CellposeParams, ModelParams, adaptive_threshold, label_regions, measure_regions,
};
use crate::microscopy::statistics::{classify_fluorophore, compute_statistics};

pub struct ChannelAnalysisPipeline<R: RasterReader, W: RgbaWriter> {
    reader: R,
    writer: W,
    config: AnalysisConfig,
    catalog: ColorCatalog<'static>,
    cancel: Cancellation,
}

impl ChannelAnalysisPipeline<TiffRasterReader, TiffRgbaWriter> {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            reader: TiffRasterReader::default(),
            writer: TiffRgbaWriter,
            config,
            catalog: ColorCatalog::standard(),
            cancel: Cancellation::none(),
        }
    }
}

impl<R: RasterReader, W: RgbaWriter> ChannelAnalysisPipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, config: AnalysisConfig) -> Self {
        Self {
            reader,
            writer,
            config,
            catalog: ColorCatalog::standard(),
            cancel: Cancellation::none(),
        }
    }

    pub fn with_catalog(mut self, catalog: ColorCatalog<'static>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_cancellation(mut self, cancel: Cancellation) -> Self {
        self.cancel = cancel;
        self
    }

    fn validate_dimensions(&self, width: usize, height: usize) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if width == 0 || height == 0 {
            return Err(AnalysisError::InvalidDimensions(width, height));
        }

        if let Some(max) = self.config.max_dimension {
            if width > max || height > max {
                warn!("Image dimensions {}x{} exceed maximum {}", width, height, max);
                return Err(AnalysisError::InvalidDimensions(width, height));
            }
        }

        Ok(())
    }

    /// Resolves every adjustment's color, failing on the first invalid one.
    fn validate_adjustments(
        &self,
        raster: &RasterBuffer,
        adjustments: &[ChannelAdjustment],
    ) -> Result<Vec<&'static ColorSpec>> {
        adjustments
            .iter()
            .map(|adj| adj.validate(raster.channel_count(), &self.catalog))
            .collect()
    }

    #[instrument(skip(self, raster, adjustments), fields(
        width = raster.width(),
        height = raster.height(),
        channels = raster.channel_count(),
        adjustments = adjustments.len()
    ))]
    pub fn analyze(&self, raster: &RasterBuffer, adjustments: &[ChannelAdjustment]) -> Result<CompositedImage> {
        info!("Starting channel analysis");

        self.validate_dimensions(raster.width(), raster.height())?;
        let colors = self.validate_adjustments(raster, adjustments)?;

        let enabled: Vec<(&ChannelAdjustment, &ColorSpec)> = adjustments
            .iter()
            .zip(colors)
            .filter(|(adj, _)| adj.enabled)
            .collect();
        if enabled.len() > MAX_COMPOSITE_LAYERS {
            return Err(AnalysisError::TooManyLayers(enabled.len()));
        }

        let channel_count = raster.channel_count();
        let colorizer = Colorizer::new(self.config.threshold_sample_limit, self.config.background_percentile);
        let mut composite = CompositeAccumulator::new(raster.width(), raster.height());

        // One plane per distinct source channel; gray rasters reuse plane 0.
        let mut planes: Vec<(usize, ChannelPlane)> = Vec::new();
        let mut channels = Vec::with_capacity(enabled.len());

        for (adjustment, color) in &enabled {
            let source = adjustment.source_channel(channel_count);
            let position = match planes.iter().position(|(c, _)| *c == source) {
                Some(position) => position,
                None => {
                    let _span = info_span!("extract", channel = source).entered();
                    planes.push((source, extract_channel(raster, source)?));
                    planes.len() - 1
                }
            };
            let plane = &planes[position].1;

            {
                let _span = info_span!("colorize", channel = source, color = color.name).entered();
                let layer = colorizer.colorize(plane, color, adjustment.contrast, &self.cancel)?;
                composite.add_layer(&layer, &self.cancel)?;
            }

            let statistics = {
                let _span = info_span!("statistics", channel = source).entered();
                compute_statistics(plane)
            };
            let fluorophore = classify_fluorophore(&statistics);
            debug!(
                channel = source,
                mean = statistics.mean,
                std_dev = statistics.std_dev,
                fluorophore = ?fluorophore.kind,
                "Channel statistics"
            );

            channels.push(ChannelReport {
                channel_index: source,
                fluorophore,
                statistics,
                color_applied: **color,
            });
        }

        let channel_correlations = {
            let _span = info_span!("colocalization").entered();
            let inputs: Vec<(usize, &ChannelPlane)> = enabled
                .iter()
                .filter_map(|(adj, _)| {
                    let source = adj.source_channel(channel_count);
                    planes.iter().find(|(c, _)| *c == source).map(|(c, p)| (*c, p))
                })
                .collect();
            pairwise_correlations(&inputs)?
        };

        let cellular_metrics = match planes.first() {
            Some((_, plane)) => {
                let _span = info_span!("cellular_metrics").entered();
                self.cellular_metrics(plane)?
            }
            None => CellularMetrics::default(),
        };

        let quality_metrics = {
            let _span = info_span!("quality").entered();
            let gray = grayscale_plane(raster);
            assess_quality(&gray, self.config.uniformity_sample_count)
        };

        let _span = info_span!("composite", layers = composite.layer_count()).entered();
        let image = composite.finish();

        info!(
            width = raster.width(),
            height = raster.height(),
            channels = channels.len(),
            "Channel analysis complete"
        );

        Ok(CompositedImage {
            image,
            analysis: AnalysisReport {
                channels,
                channel_correlations,
                cellular_metrics,
                quality_metrics,
            },
        })
    }

    fn cellular_metrics(&self, plane: &ChannelPlane) -> Result<CellularMetrics> {
        let threshold = adaptive_threshold(plane, &ModelParams::Cellpose(CellposeParams::default()));
        let regions = label_regions(plane, threshold, self.config.cellular_min_size, &self.cancel)?;
        if regions.is_empty() {
            return Ok(CellularMetrics::default());
        }

        let metrics = measure_regions(&regions, plane.width(), plane.height());
        let count = metrics.len() as f64;
        let covered: usize = metrics.iter().map(|m| m.area).sum();
        Ok(CellularMetrics {
            estimated_cell_count: metrics.len(),
            average_cell_area: covered as f64 / count,
            average_circularity: metrics.iter().map(|m| m.circularity).sum::<f64>() / count,
            coverage_fraction: covered as f64 / plane.len() as f64,
        })
    }

    #[instrument(skip(self, input_data, adjustments), fields(input_size = input_data.len()))]
    pub fn analyze_bytes(&self, input_data: &[u8], adjustments: &[ChannelAdjustment]) -> Result<CompositedImage> {
        let raster = {
            let _span = info_span!("decode_raster").entered();
            self.reader.read_raster(input_data)?
        };
        self.analyze(&raster, adjustments)
    }

    /// Analyzes `input_data` and writes the composite to `output`.
    pub fn analyze_to_writer(
        &self,
        input_data: &[u8],
        adjustments: &[ChannelAdjustment],
        output: &mut dyn Write,
    ) -> Result<AnalysisReport> {
        let composited = self.analyze_bytes(input_data, adjustments)?;
        {
            let _span = info_span!("encode_composite").entered();
            self.writer.write_rgba(&composited.image, output, &self.config.output)?;
        }
        Ok(composited.analysis)
    }

    #[instrument(skip(self, input_path, output_path, adjustments))]
    pub fn analyze_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
        adjustments: &[ChannelAdjustment],
    ) -> Result<AnalysisReport> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        info!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Analyzing file"
        );

        let input_data = {
            let _span = info_span!("read_input_file").entered();
            std::fs::read(input_path).map_err(|e| {
                AnalysisError::DecodeError(format!("{}: {}", input_path.display(), e))
            })?
        };

        let composited = self.analyze_bytes(&input_data, adjustments)?;

        let mut output_file = {
            let _span = info_span!("create_output_file").entered();
            std::fs::File::create(output_path).map_err(|e| {
                AnalysisError::EncodeError(format!("{}: {}", output_path.display(), e))
            })?
        };

        {
            let _span = info_span!("encode_composite").entered();
            self.writer.write_rgba(&composited.image, &mut output_file, &self.config.output)?;
        }

        Ok(composited.analysis)
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: AnalysisConfig) {
        self.config = config;
    }

    pub fn catalog(&self) -> &ColorCatalog<'static> {
        &self.catalog
    }
}
