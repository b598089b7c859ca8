//! Raster I/O adapters
//!
//! Format decoding and encoding sit behind two small traits so the analysis
//! pipeline can be driven from memory, from TIFF files, or from test doubles.

mod reader;
mod tiff_reader;
mod tiff_writer;
pub mod types;
mod writer;

pub use reader::RasterReader;
pub use tiff_reader::TiffRasterReader;
pub use tiff_writer::TiffRgbaWriter;
pub use types::{PageSelection, RgbaWriteConfig, RgbaWriteConfigBuilder, TiffCompression};
pub use writer::RgbaWriter;
