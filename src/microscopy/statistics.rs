//! Per-channel descriptive statistics and the fluorophore-type heuristic.

mod fluorophore;
mod moments;

pub use fluorophore::{FluorophoreGuess, FluorophoreType, classify_fluorophore};
pub use moments::{ChannelStatistics, EPSILON, compute_statistics};
