#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};
    use std::sync::{Arc, Mutex};

    use crate::microscopy::analysis::{AnalysisConfig, ChannelAnalysisPipeline};
    use crate::microscopy::colocalization::CorrelationStrength;
    use crate::microscopy::colormap::{ChannelAdjustment, ColorCatalog, Colorizer};
    use crate::microscopy::common::{AnalysisError, Cancellation, Result};
    use crate::microscopy::io::{RasterReader, RgbaWriteConfig, RgbaWriter};
    use crate::microscopy::quality::QualityRating;
    use crate::microscopy::raster::{RasterBuffer, RgbaBuffer, extract_channel};

    struct MockReader {
        should_fail: bool,
        raster: Option<RasterBuffer>,
        calls: Arc<Mutex<usize>>,
    }

    impl MockReader {
        fn with(raster: RasterBuffer) -> Self {
            Self {
                should_fail: false,
                raster: Some(raster),
                calls: Arc::new(Mutex::new(0)),
            }
        }
    }

    impl RasterReader for MockReader {
        fn read_raster(&self, _data: &[u8]) -> Result<RasterBuffer> {
            *self.calls.lock().unwrap() += 1;
            if self.should_fail {
                return Err(AnalysisError::DecodeError("Mock decode error".to_string()));
            }
            Ok(self.raster.clone().unwrap_or_else(two_cell_raster))
        }
    }

    struct MockWriter {
        should_fail: bool,
        written: Arc<Mutex<Vec<RgbaBuffer>>>,
    }

    impl MockWriter {
        fn new() -> Self {
            Self {
                should_fail: false,
                written: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl RgbaWriter for MockWriter {
        fn write_rgba(&self, image: &RgbaBuffer, _output: &mut dyn Write, _config: &RgbaWriteConfig) -> Result<()> {
            if self.should_fail {
                return Err(AnalysisError::EncodeError("Mock encode error".to_string()));
            }
            self.written.lock().unwrap().push(image.clone());
            Ok(())
        }
    }

    /// 16x16, three channels. Channel 0 holds three separate bright blobs,
    /// channel 1 the same pattern at half intensity, channel 2 the inverse.
    fn two_cell_raster() -> RasterBuffer {
        let (w, h) = (16, 16);
        let mut data = Vec::with_capacity(w * h * 3);
        for y in 0..h {
            for x in 0..w {
                let inside = (1..7).contains(&y) && ((1..7).contains(&x) || (9..15).contains(&x))
                    || (10..14).contains(&y) && (3..13).contains(&x);
                let v: u8 = if inside { 220 } else { 15 };
                data.extend_from_slice(&[v, v / 2, 255 - v]);
            }
        }
        RasterBuffer::new(w, h, 3, data).unwrap()
    }

    fn pipeline(reader: MockReader) -> ChannelAnalysisPipeline<MockReader, MockWriter> {
        let config = AnalysisConfig::builder().cellular_min_size(10).build();
        ChannelAnalysisPipeline::with_custom(reader, MockWriter::new(), config)
    }

    #[test]
    fn test_config_builder() {
        let config = AnalysisConfig::builder()
            .threshold_sample_limit(500)
            .background_percentile(0.1)
            .validate_dimensions(false)
            .max_dimension(None)
            .build();

        assert_eq!(config.threshold_sample_limit, 500);
        assert_eq!(config.background_percentile, 0.1);
        assert!(!config.validate_dimensions);
        assert_eq!(config.max_dimension, None);
        assert_eq!(config.uniformity_sample_count, 100);
        assert_eq!(config.cellular_min_size, 50);
    }

    #[test]
    fn test_full_analysis() {
        let raster = two_cell_raster();
        let adjustments = [
            ChannelAdjustment::new(0, 1),
            ChannelAdjustment::new(1, 2).with_contrast(130),
            ChannelAdjustment::new(2, 3),
        ];
        let result = pipeline(MockReader::with(raster.clone()))
            .analyze(&raster, &adjustments)
            .unwrap();
        let report = &result.analysis;

        assert_eq!(report.channels.len(), 3);
        assert_eq!(report.channels[0].channel_index, 0);
        assert_eq!(report.channels[0].color_applied.fluorophore, "DAPI");
        assert_eq!(report.channels[1].statistics.max, 110);

        let pairs: Vec<(usize, usize)> = report
            .channel_correlations
            .iter()
            .map(|c| (c.channel1, c.channel2))
            .collect();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 2)]);
        assert!(report.channel_correlations[0].pearson_correlation > 0.99);
        assert!(report.channel_correlations[1].pearson_correlation < -0.99);
        assert_eq!(report.channel_correlations[1].interpretation, CorrelationStrength::Strong);

        assert_eq!(report.cellular_metrics.estimated_cell_count, 3);
        assert!(report.cellular_metrics.coverage_fraction > 0.0);

        assert_eq!(result.image.dimensions(), (16, 16));
        // Channel 2 is bright wherever channel 0 sits at background.
        assert!(result.image.data().chunks_exact(4).all(|p| p[3] == 255));
    }

    #[test]
    fn test_disabled_adjustments_are_skipped() {
        let raster = two_cell_raster();
        let adjustments = [ChannelAdjustment::new(0, 1), ChannelAdjustment::new(1, 2).disabled()];
        let result = pipeline(MockReader::with(raster.clone()))
            .analyze(&raster, &adjustments)
            .unwrap();
        assert_eq!(result.analysis.channels.len(), 1);
        assert!(result.analysis.channel_correlations.is_empty());
    }

    #[test]
    fn test_single_channel_composite_matches_colorize() {
        let raster = two_cell_raster();
        let adjustment = ChannelAdjustment::new(0, 6).with_contrast(80);
        let result = pipeline(MockReader::with(raster.clone()))
            .analyze(&raster, &[adjustment])
            .unwrap();

        let plane = extract_channel(&raster, 0).unwrap();
        let color = ColorCatalog::standard().lookup(6).unwrap();
        let direct = Colorizer::default()
            .colorize(&plane, color, 80, &Cancellation::none())
            .unwrap();
        assert_eq!(result.image, direct);
    }

    #[test]
    fn test_invalid_channel_fails_before_work() {
        let raster = two_cell_raster();
        let adjustments = [ChannelAdjustment::new(0, 1), ChannelAdjustment::new(5, 2)];
        let writer = MockWriter::new();
        let written = writer.written.clone();
        let reader = MockReader::with(raster.clone());
        let pipeline = ChannelAnalysisPipeline::with_custom(reader, writer, AnalysisConfig::default());

        let mut output = Cursor::new(Vec::new());
        let err = pipeline
            .analyze_to_writer(b"fake tiff", &adjustments, &mut output)
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InvalidChannel {
                channel: 5,
                channel_count: 3
            }
        ));
        assert!(written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_grayscale_overlays_same_plane() {
        let data: Vec<u8> = (0..64).map(|i| if i % 9 == 0 { 240 } else { 20 }).collect();
        let raster = RasterBuffer::new(8, 8, 1, data).unwrap();
        let adjustments = [ChannelAdjustment::new(0, 2), ChannelAdjustment::new(3, 3)];
        let result = pipeline(MockReader::with(raster.clone()))
            .analyze(&raster, &adjustments)
            .unwrap();

        let report = &result.analysis;
        assert_eq!(report.channels.len(), 2);
        assert!(report.channels.iter().all(|c| c.channel_index == 0));
        assert_eq!(report.channel_correlations.len(), 1);
        assert!((report.channel_correlations[0].pearson_correlation - 1.0).abs() < 1e-9);

        // Green (0, 240, 0) and red (240, 0, 0) average per component.
        assert_eq!(result.image.pixel(0, 0), [120, 120, 0, 255]);
        assert_eq!(result.image.pixel(1, 0)[3], 0);
    }

    #[test]
    fn test_no_enabled_adjustments() {
        let raster = two_cell_raster();
        let result = pipeline(MockReader::with(raster.clone()))
            .analyze(&raster, &[ChannelAdjustment::new(0, 1).disabled()])
            .unwrap();
        assert!(result.analysis.channels.is_empty());
        assert_eq!(result.analysis.cellular_metrics.estimated_cell_count, 0);
        assert!(result.image.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_too_many_layers_rejected_up_front() {
        let raster = RasterBuffer::new(4, 4, 1, vec![200; 16]).unwrap();
        let adjustments: Vec<ChannelAdjustment> = (0..258).map(|i| ChannelAdjustment::new(0, (i % 12) as u8 + 1)).collect();
        let err = pipeline(MockReader::with(raster.clone()))
            .analyze(&raster, &adjustments)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::TooManyLayers(258)));
    }

    #[test]
    fn test_reader_failure() {
        let reader = MockReader {
            should_fail: true,
            raster: None,
            calls: Arc::new(Mutex::new(0)),
        };
        let calls = reader.calls.clone();
        let err = pipeline(reader)
            .analyze_bytes(b"fake", &[ChannelAdjustment::new(0, 1)])
            .unwrap_err();
        assert!(matches!(err, AnalysisError::DecodeError(_)));
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn test_writer_failure() {
        let writer = MockWriter {
            should_fail: true,
            written: Arc::new(Mutex::new(Vec::new())),
        };
        let reader = MockReader::with(two_cell_raster());
        let pipeline = ChannelAnalysisPipeline::with_custom(reader, writer, AnalysisConfig::default());
        let mut output = Cursor::new(Vec::new());
        let err = pipeline
            .analyze_to_writer(b"fake", &[ChannelAdjustment::new(0, 1)], &mut output)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::EncodeError(_)));
    }

    #[test]
    fn test_dimension_validation() {
        let raster = RasterBuffer::new(600, 1, 1, vec![0; 600]).unwrap();
        let config = AnalysisConfig::builder().max_dimension(Some(500)).build();
        let pipeline = ChannelAnalysisPipeline::with_custom(MockReader::with(raster.clone()), MockWriter::new(), config);
        assert!(matches!(
            pipeline.analyze(&raster, &[]),
            Err(AnalysisError::InvalidDimensions(600, 1))
        ));

        let empty = RasterBuffer::new(0, 0, 3, Vec::new()).unwrap();
        assert!(matches!(
            pipeline.analyze(&empty, &[]),
            Err(AnalysisError::InvalidDimensions(0, 0))
        ));
    }

    #[test]
    fn test_cancelled_analysis() {
        let raster = two_cell_raster();
        let cancel = Cancellation::new();
        cancel.cancel();
        let pipeline = pipeline(MockReader::with(raster.clone())).with_cancellation(cancel);
        assert!(matches!(
            pipeline.analyze(&raster, &[ChannelAdjustment::new(0, 1)]),
            Err(AnalysisError::Cancelled)
        ));
    }

    #[test]
    fn test_report_json_shape() {
        let raster = two_cell_raster();
        let result = pipeline(MockReader::with(raster.clone()))
            .analyze(&raster, &[ChannelAdjustment::new(0, 1), ChannelAdjustment::new(2, 3)])
            .unwrap();
        let json = serde_json::to_value(&result.analysis).unwrap();

        let channel = &json["channels"][0];
        assert_eq!(channel["channelIndex"], 0);
        assert!(channel["fluorophore"]["type"].is_string());
        assert!(channel["fluorophore"]["confidence"].is_number());
        assert_eq!(channel["statistics"]["histogram"].as_array().unwrap().len(), 256);
        assert_eq!(channel["colorApplied"]["id"], 1);

        let correlation = &json["channelCorrelations"][0];
        assert_eq!(correlation["channel1"], 0);
        assert_eq!(correlation["channel2"], 2);
        assert_eq!(correlation["interpretation"], "Strong");
        assert!(correlation["pearsonCorrelation"].is_number());

        assert!(json["cellularMetrics"]["estimatedCellCount"].is_number());
        assert!(json["qualityMetrics"]["focus"]["rating"].is_string());
        assert!(json["qualityMetrics"]["backgroundUniformity"]["score"].is_number());
    }

    #[test]
    fn test_quality_of_flat_raster() {
        let raster = RasterBuffer::new(10, 10, 2, vec![50; 200]).unwrap();
        let result = pipeline(MockReader::with(raster.clone()))
            .analyze(&raster, &[ChannelAdjustment::new(1, 4)])
            .unwrap();
        let quality = result.analysis.quality_metrics;
        assert_eq!(quality.focus.rating, QualityRating::Poor);
        assert_eq!(quality.background_uniformity.rating, QualityRating::Excellent);
    }

    #[test]
    fn test_analyze_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("input.tif");
        let output_path = dir.path().join("composite.tif");

        let raster = two_cell_raster();
        {
            let file = std::fs::File::create(&input_path).unwrap();
            let mut encoder = tiff::encoder::TiffEncoder::new(file).unwrap();
            encoder
                .write_image::<tiff::encoder::colortype::RGB8>(16, 16, raster.data())
                .unwrap();
        }

        let pipeline = ChannelAnalysisPipeline::new(AnalysisConfig::builder().cellular_min_size(10).build());
        let adjustments = [ChannelAdjustment::new(0, 1), ChannelAdjustment::new(1, 2)];
        let report = pipeline.analyze_file(&input_path, &output_path, &adjustments).unwrap();
        assert_eq!(report.channels.len(), 2);
        assert_eq!(report.cellular_metrics.estimated_cell_count, 3);

        let written = std::fs::read(&output_path).unwrap();
        let decoded = crate::microscopy::io::TiffRasterReader::default()
            .read_raster(&written)
            .unwrap();
        assert_eq!((decoded.width(), decoded.height(), decoded.channel_count()), (16, 16, 4));
    }

    #[test]
    fn test_analyze_file_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = ChannelAnalysisPipeline::new(AnalysisConfig::default());
        let err = pipeline
            .analyze_file(dir.path().join("missing.tif"), dir.path().join("out.tif"), &[])
            .unwrap_err();
        assert!(matches!(err, AnalysisError::DecodeError(_)));
    }
}
