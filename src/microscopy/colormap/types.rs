use serde::{Deserialize, Serialize};

use crate::microscopy::colormap::catalog::{ColorCatalog, ColorSpec};
use crate::microscopy::common::error::{AnalysisError, Result};

pub const MIN_CONTRAST: u32 = 50;
pub const MAX_CONTRAST: u32 = 150;
pub const DEFAULT_CONTRAST: u32 = 100;

/// Caller-supplied display settings for one composited layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelAdjustment {
    pub channel: usize,
    pub color_id: u8,
    #[serde(default = "default_contrast")]
    pub contrast: u32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_contrast() -> u32 {
    DEFAULT_CONTRAST
}

fn default_enabled() -> bool {
    true
}

impl ChannelAdjustment {
    pub fn new(channel: usize, color_id: u8) -> Self {
        Self {
            channel,
            color_id,
            contrast: DEFAULT_CONTRAST,
            enabled: true,
        }
    }

    pub fn with_contrast(mut self, contrast: u32) -> Self {
        self.contrast = contrast;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Checks the adjustment against a raster with `channel_count` channels
    /// and returns the catalog color it refers to.
    ///
    /// Gray rasters accept any channel index: each adjustment overlays the
    /// single plane.
    pub fn validate<'a>(
        &self,
        channel_count: usize,
        catalog: &ColorCatalog<'a>,
    ) -> Result<&'a ColorSpec> {
        if channel_count > 1 && self.channel >= channel_count {
            return Err(AnalysisError::InvalidChannel {
                channel: self.channel,
                channel_count,
            });
        }
        validate_contrast(self.contrast)?;
        catalog.lookup(self.color_id)
    }

    /// Channel to read for a raster with `channel_count` channels.
    pub fn source_channel(&self, channel_count: usize) -> usize {
        if channel_count == 1 { 0 } else { self.channel }
    }
}

pub(crate) fn validate_contrast(contrast: u32) -> Result<()> {
    if !(MIN_CONTRAST..=MAX_CONTRAST).contains(&contrast) {
        return Err(AnalysisError::InvalidContrast(contrast));
    }
    Ok(())
}
