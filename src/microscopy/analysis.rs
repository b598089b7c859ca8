mod pipeline;
pub mod types;

#[cfg(test)]
mod tests;

pub use pipeline::ChannelAnalysisPipeline;
pub use types::{
    AnalysisConfig, AnalysisConfigBuilder, AnalysisReport, CellularMetrics, ChannelReport,
    CompositedImage,
};
