//! I/O configuration types

use tiff::encoder::Compression;
use tiff::encoder::compression::DeflateLevel;
use tiff::tags::Predictor;

/// Which TIFF directories become channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSelection {
    /// Only the first page; its samples are the channels.
    #[default]
    First,
    /// A single page by zero-based index.
    Page(usize),
    /// Every page is one gray channel. All pages must share dimensions.
    StackAsChannels,
}

/// TIFF compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    None,
    /// LZW compression
    Lzw,
    /// Deflate compression - fast level
    DeflateFast,
    /// Deflate compression - balanced
    DeflateBalanced,
    /// Deflate compression - best compression (slower)
    DeflateBest,
}

impl TiffCompression {
    pub(crate) fn encoder_setting(self) -> Compression {
        match self {
            Self::None => Compression::Uncompressed,
            Self::Lzw => Compression::Lzw,
            Self::DeflateFast => Compression::Deflate(DeflateLevel::Fast),
            Self::DeflateBalanced => Compression::Deflate(DeflateLevel::Balanced),
            Self::DeflateBest => Compression::Deflate(DeflateLevel::Best),
        }
    }
}

/// Configuration for writing RGBA output
#[derive(Debug, Clone)]
pub struct RgbaWriteConfig {
    pub compression: TiffCompression,
    /// Predictor value for compression (2 for horizontal differencing)
    pub predictor: Option<u16>,
}

impl Default for RgbaWriteConfig {
    fn default() -> Self {
        Self {
            compression: TiffCompression::Lzw,
            predictor: None,
        }
    }
}

impl RgbaWriteConfig {
    pub fn builder() -> RgbaWriteConfigBuilder {
        RgbaWriteConfigBuilder::default()
    }

    /// Only the TIFF horizontal-differencing value 2 enables a predictor.
    pub(crate) fn encoder_predictor(&self) -> Predictor {
        match self.predictor {
            Some(2) => Predictor::Horizontal,
            _ => Predictor::None,
        }
    }
}

#[derive(Default)]
pub struct RgbaWriteConfigBuilder {
    compression: Option<TiffCompression>,
    predictor: Option<Option<u16>>,
}

impl RgbaWriteConfigBuilder {
    pub fn compression(mut self, compression: TiffCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn predictor(mut self, predictor: Option<u16>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn build(self) -> RgbaWriteConfig {
        let default = RgbaWriteConfig::default();
        RgbaWriteConfig {
            compression: self.compression.unwrap_or(default.compression),
            predictor: self.predictor.unwrap_or(default.predictor),
        }
    }
}
