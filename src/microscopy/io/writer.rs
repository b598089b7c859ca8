use std::io::Write;

use crate::microscopy::common::error::Result;
use crate::microscopy::io::types::RgbaWriteConfig;
use crate::microscopy::raster::RgbaBuffer;

pub trait RgbaWriter {
    fn write_rgba(&self, image: &RgbaBuffer, output: &mut dyn Write, config: &RgbaWriteConfig) -> Result<()>;
}
