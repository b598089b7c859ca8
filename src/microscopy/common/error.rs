use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid channel {channel}: raster has {channel_count} channel(s)")]
    InvalidChannel { channel: usize, channel_count: usize },

    #[error("Unknown segmentation model: {0}")]
    UnknownModel(String),

    #[error("Dimension mismatch: expected {}x{}, got {}x{}", expected.0, expected.1, actual.0, actual.1)]
    DimensionMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Unknown color id: {0}")]
    UnknownColor(u8),

    #[error("Contrast {0}% is outside 50..=150")]
    InvalidContrast(u32),

    #[error("Invalid raster: {0}")]
    InvalidRaster(String),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Opening kernel must be odd and non-zero, got {0}")]
    InvalidKernel(usize),

    #[error("Too many composite layers: {0}")]
    TooManyLayers(usize),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Deadline exceeded")]
    DeadlineExceeded,

    #[error("Failed to decode raster: {0}")]
    DecodeError(String),

    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
