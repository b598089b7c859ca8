use std::path::Path;

use anyhow::{Context, bail};
use fluoro_analysis_rs::logger;
use fluoro_analysis_rs::microscopy::analysis::{AnalysisConfig, ChannelAnalysisPipeline};
use fluoro_analysis_rs::microscopy::colormap::{ChannelAdjustment, STANDARD_COLORS};
use fluoro_analysis_rs::microscopy::io::{RasterReader, RgbaWriteConfig, RgbaWriter, TiffRasterReader, TiffRgbaWriter};
use fluoro_analysis_rs::microscopy::raster::extract_channel;
use fluoro_analysis_rs::microscopy::segmentation::Segmenter;

use tracing::{error, info};

const USAGE: &str = "usage:
  fluoro_analysis <input.tif> <composite.tif> [adjustments.json]
  fluoro_analysis segment <input.tif> <mask.tif> [model] [channel]";

fn main() -> anyhow::Result<()> {
    logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        Some("segment") => run_segment(&args[1..]),
        Some(_) => run_analysis(&args),
        None => bail!("{USAGE}"),
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}

fn run_analysis(args: &[String]) -> anyhow::Result<()> {
    let [input, output, rest @ ..] = args else {
        bail!("{USAGE}");
    };

    let pipeline = ChannelAnalysisPipeline::new(AnalysisConfig::default());

    let adjustments = match rest.first() {
        Some(path) => load_adjustments(Path::new(path))?,
        None => {
            let data = std::fs::read(input).with_context(|| format!("reading {input}"))?;
            let raster = TiffRasterReader::default().read_raster(&data)?;
            default_adjustments(raster.channel_count())
        }
    };

    info!("Analyzing {} with {} adjustments", input, adjustments.len());
    let report = pipeline
        .analyze_file(input, output, &adjustments)
        .with_context(|| format!("analyzing {input}"))?;
    info!("Composite written to {}", output);

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_segment(args: &[String]) -> anyhow::Result<()> {
    let [input, output, rest @ ..] = args else {
        bail!("{USAGE}");
    };
    let model = rest.first().map(String::as_str).unwrap_or("cellpose");
    let channel: usize = match rest.get(1) {
        Some(c) => c.parse().with_context(|| format!("invalid channel index {c}"))?,
        None => 0,
    };

    let data = std::fs::read(input).with_context(|| format!("reading {input}"))?;
    let raster = TiffRasterReader::default().read_raster(&data)?;
    let plane = extract_channel(&raster, channel)?;

    let result = Segmenter::for_model(model)?.segment(&plane)?;
    info!("Found {} regions with {}", result.metadata.total_cells, model);

    let mut file = std::fs::File::create(output).with_context(|| format!("creating {output}"))?;
    TiffRgbaWriter.write_rgba(&result.mask, &mut file, &RgbaWriteConfig::default())?;

    let summary = serde_json::json!({
        "metadata": result.metadata,
        "regions": result.regions,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn load_adjustments(path: &Path) -> anyhow::Result<Vec<ChannelAdjustment>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// One adjustment per channel, cycling through the catalog in order.
fn default_adjustments(channel_count: usize) -> Vec<ChannelAdjustment> {
    (0..channel_count)
        .map(|channel| {
            let color = &STANDARD_COLORS[channel % STANDARD_COLORS.len()];
            ChannelAdjustment::new(channel, color.id)
        })
        .collect()
}
