//! Raster buffers and channel extraction
//!
//! Decoded multi-channel rasters come in from an I/O adapter; every analysis
//! stage works on single-channel planes pulled out of them.

mod extract;
pub mod types;

pub use extract::{extract_channel, grayscale_plane};
pub use types::{ChannelPlane, RasterBuffer, RgbaBuffer};
