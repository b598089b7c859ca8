use std::io::{Cursor, Write};

use tiff::encoder::TiffEncoder;
use tiff::encoder::colortype::RGBA8;
use tracing::debug;

use crate::microscopy::common::error::{AnalysisError, Result};
use crate::microscopy::io::types::RgbaWriteConfig;
use crate::microscopy::io::writer::RgbaWriter;
use crate::microscopy::raster::RgbaBuffer;

/// Single-page RGBA8 TIFF output.
///
/// The encoder needs `Seek`, so the page is built in memory and then copied
/// to the caller's writer.
pub struct TiffRgbaWriter;

fn encode_error(e: impl std::fmt::Display) -> AnalysisError {
    AnalysisError::EncodeError(e.to_string())
}

fn encode_page(image: &RgbaBuffer, config: &RgbaWriteConfig) -> Result<Vec<u8>> {
    let width = u32::try_from(image.width()).map_err(encode_error)?;
    let height = u32::try_from(image.height()).map_err(encode_error)?;

    let mut page = Cursor::new(Vec::with_capacity(image.data().len() / 2));
    TiffEncoder::new(&mut page)
        .map_err(encode_error)?
        .with_compression(config.compression.encoder_setting())
        .with_predictor(config.encoder_predictor())
        .write_image::<RGBA8>(width, height, image.data())
        .map_err(encode_error)?;
    Ok(page.into_inner())
}

impl RgbaWriter for TiffRgbaWriter {
    fn write_rgba(&self, image: &RgbaBuffer, output: &mut dyn Write, config: &RgbaWriteConfig) -> Result<()> {
        let page = encode_page(image, config)?;
        output.write_all(&page)?;
        debug!(
            width = image.width(),
            height = image.height(),
            compression = ?config.compression,
            bytes = page.len(),
            "Wrote RGBA TIFF"
        );
        Ok(())
    }
}
