//! Common utilities module
//!
//! This module contains the error taxonomy and the cancellation handle shared
//! by every stage of the analysis engine.

pub mod cancellation;
pub mod error;

pub use cancellation::Cancellation;
pub use error::{AnalysisError, Result};
