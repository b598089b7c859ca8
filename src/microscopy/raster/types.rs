//! Pixel buffer types shared by every stage

use crate::microscopy::common::error::{AnalysisError, Result};

/// Decoded interleaved raster, `channel_count` bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    width: usize,
    height: usize,
    channel_count: usize,
    data: Vec<u8>,
}

impl RasterBuffer {
    pub fn new(width: usize, height: usize, channel_count: usize, data: Vec<u8>) -> Result<Self> {
        if channel_count == 0 {
            return Err(AnalysisError::InvalidRaster("channel count is zero".to_string()));
        }
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(channel_count))
            .ok_or(AnalysisError::InvalidDimensions(width, height))?;
        if data.len() != expected {
            return Err(AnalysisError::InvalidRaster(format!(
                "expected {} bytes for {}x{}x{}, got {}",
                expected,
                width,
                height,
                channel_count,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channel_count,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn is_grayscale(&self) -> bool {
        self.channel_count == 1
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// One value per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelPlane {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl ChannelPlane {
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        let expected = width
            .checked_mul(height)
            .ok_or(AnalysisError::InvalidDimensions(width, height))?;
        if data.len() != expected {
            return Err(AnalysisError::InvalidRaster(format!(
                "expected {} bytes for {}x{} plane, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Caller guarantees `data.len() == width * height`.
    pub(crate) fn from_parts(width: usize, height: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            width,
            height,
            data,
        }
    }

    /// Builds a plane from row slices of equal length.
    pub fn from_rows(rows: &[&[u8]]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        let mut data = Vec::with_capacity(width * height);
        for row in rows {
            if row.len() != width {
                return Err(AnalysisError::DimensionMismatch {
                    expected: (width, height),
                    actual: (row.len(), height),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// At most `limit` values spread evenly over the whole buffer, the
    /// `i`-th taken at index `i * len / n`.
    pub fn strided_samples(&self, limit: usize) -> impl Iterator<Item = u8> + '_ {
        let len = self.data.len();
        let n = limit.min(len);
        (0..n).map(move |i| self.data[i * len / n])
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    pub fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    pub fn ensure_same_dimensions(&self, other: &ChannelPlane) -> Result<()> {
        if self.dimensions() != other.dimensions() {
            return Err(AnalysisError::DimensionMismatch {
                expected: self.dimensions(),
                actual: other.dimensions(),
            });
        }
        Ok(())
    }
}

/// RGBA8 output buffer, `[R, G, B, A, R, G, B, A, ...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl RgbaBuffer {
    /// Fully transparent buffer.
    pub fn transparent(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height * 4],
        }
    }

    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        if data.len() != width * height * 4 {
            return Err(AnalysisError::InvalidRaster(format!(
                "expected {} bytes for {}x{} RGBA, got {}",
                width * height * 4,
                width,
                height,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        let i = (y * self.width + x) * 4;
        self.data[i..i + 4].copy_from_slice(&rgba);
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}
