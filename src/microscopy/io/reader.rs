use crate::microscopy::common::error::Result;
use crate::microscopy::raster::RasterBuffer;

pub trait RasterReader {
    fn read_raster(&self, data: &[u8]) -> Result<RasterBuffer>;
}
