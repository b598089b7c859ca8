//! Multi-channel raster reader backed by the `tiff` crate.
//!
//! Samples of one page become the raster's channels (gray, gray+alpha, RGB,
//! RGBA or multiband). Alternatively every page of a stack becomes one gray
//! channel, which is how many microscopes store channel series.

use std::io::Cursor;

use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};
use tracing::debug;

use crate::microscopy::common::error::{AnalysisError, Result};
use crate::microscopy::io::reader::RasterReader;
use crate::microscopy::io::types::PageSelection;
use crate::microscopy::raster::RasterBuffer;

#[derive(Debug, Clone, Copy, Default)]
pub struct TiffRasterReader {
    pub pages: PageSelection,
}

struct DecodedPage {
    width: usize,
    height: usize,
    samples: usize,
    data: Vec<u8>,
}

impl TiffRasterReader {
    pub fn new(pages: PageSelection) -> Self {
        Self { pages }
    }

    fn decode_page<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> Result<DecodedPage> {
        let (width, height) = decoder
            .dimensions()
            .map_err(|e| AnalysisError::DecodeError(e.to_string()))?;
        let color = decoder
            .colortype()
            .map_err(|e| AnalysisError::DecodeError(e.to_string()))?;

        let samples = match color {
            ColorType::Gray(_) => 1,
            ColorType::GrayA(_) => 2,
            ColorType::RGB(_) => 3,
            ColorType::RGBA(_) => 4,
            ColorType::Multiband { num_samples, .. } => num_samples as usize,
            other => {
                return Err(AnalysisError::UnsupportedFormat(format!("{:?}", other)));
            }
        };

        let image = decoder
            .read_image()
            .map_err(|e| AnalysisError::DecodeError(e.to_string()))?;

        // 16-bit samples keep their high byte.
        let data: Vec<u8> = match image {
            DecodingResult::U8(values) => values,
            DecodingResult::U16(values) => values.iter().map(|&v| (v >> 8) as u8).collect(),
            _ => {
                return Err(AnalysisError::UnsupportedFormat(format!(
                    "sample type of {:?}",
                    color
                )));
            }
        };

        debug!(width, height, samples, "Decoded TIFF page");
        Ok(DecodedPage {
            width: width as usize,
            height: height as usize,
            samples,
            data,
        })
    }

    fn stack_pages<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> Result<RasterBuffer> {
        let mut pages = vec![Self::decode_page(decoder)?];
        while decoder.more_images() {
            decoder
                .next_image()
                .map_err(|e| AnalysisError::DecodeError(e.to_string()))?;
            pages.push(Self::decode_page(decoder)?);
        }

        let (width, height) = (pages[0].width, pages[0].height);
        for page in &pages {
            if (page.width, page.height) != (width, height) {
                return Err(AnalysisError::DimensionMismatch {
                    expected: (width, height),
                    actual: (page.width, page.height),
                });
            }
            if page.samples != 1 {
                return Err(AnalysisError::UnsupportedFormat(format!(
                    "stacked pages must be single-sample, found {} samples",
                    page.samples
                )));
            }
        }

        let channel_count = pages.len();
        let mut data = vec![0u8; width * height * channel_count];
        for (channel, page) in pages.iter().enumerate() {
            for (i, &v) in page.data.iter().enumerate() {
                data[i * channel_count + channel] = v;
            }
        }
        RasterBuffer::new(width, height, channel_count, data)
    }
}

impl RasterReader for TiffRasterReader {
    fn read_raster(&self, data: &[u8]) -> Result<RasterBuffer> {
        debug!("Decoding TIFF raster, {} bytes", data.len());

        let mut decoder = Decoder::new(Cursor::new(data))
            .map_err(|e| AnalysisError::DecodeError(e.to_string()))?;

        match self.pages {
            PageSelection::First => {}
            PageSelection::Page(index) => decoder
                .seek_to_image(index)
                .map_err(|e| AnalysisError::DecodeError(e.to_string()))?,
            PageSelection::StackAsChannels => return Self::stack_pages(&mut decoder),
        }

        let page = Self::decode_page(&mut decoder)?;
        RasterBuffer::new(page.width, page.height, page.samples, page.data)
    }
}
