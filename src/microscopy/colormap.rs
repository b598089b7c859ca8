//! Colormap module
//!
//! Fixed fluorophore color catalog, per-channel adaptive-threshold
//! colorization and multi-layer compositing.

pub mod catalog;
mod colorize;
mod composite;
pub mod types;

pub use catalog::{ColorCatalog, ColorSpec, STANDARD_COLORS};
pub use colorize::{Colorizer, background_threshold};
pub use composite::{CompositeAccumulator, MAX_COMPOSITE_LAYERS, composite_layers};
pub use types::{ChannelAdjustment, DEFAULT_CONTRAST, MAX_CONTRAST, MIN_CONTRAST};
