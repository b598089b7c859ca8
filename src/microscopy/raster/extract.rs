use tracing::debug;

use crate::microscopy::common::error::{AnalysisError, Result};
use crate::microscopy::raster::types::{ChannelPlane, RasterBuffer};

/// Pulls channel `channel` out of an interleaved raster.
///
/// The index is checked before the output plane is allocated.
pub fn extract_channel(raster: &RasterBuffer, channel: usize) -> Result<ChannelPlane> {
    let channel_count = raster.channel_count();
    if channel >= channel_count {
        return Err(AnalysisError::InvalidChannel {
            channel,
            channel_count,
        });
    }

    debug!(
        channel,
        channel_count,
        width = raster.width(),
        height = raster.height(),
        "Extracting channel plane"
    );

    let data: Vec<u8> = if channel_count == 1 {
        raster.data().to_vec()
    } else {
        raster
            .data()
            .chunks_exact(channel_count)
            .map(|pixel| pixel[channel])
            .collect()
    };

    Ok(ChannelPlane::from_parts(raster.width(), raster.height(), data))
}

/// Per-pixel mean across all channels. Gray rasters are returned as-is.
pub fn grayscale_plane(raster: &RasterBuffer) -> ChannelPlane {
    let channel_count = raster.channel_count();
    let data: Vec<u8> = if channel_count == 1 {
        raster.data().to_vec()
    } else {
        raster
            .data()
            .chunks_exact(channel_count)
            .map(|pixel| {
                let sum: u32 = pixel.iter().map(|&v| v as u32).sum();
                (sum / channel_count as u32) as u8
            })
            .collect()
    };
    ChannelPlane::from_parts(raster.width(), raster.height(), data)
}
