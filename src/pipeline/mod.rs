//! Pipeline module - ranking, threshold, candidate search and its collaborators

pub mod error;
pub mod evaluator;
pub mod importance;
pub mod loader;
pub mod metrics;
pub mod search;
pub mod split;
pub mod target;
pub mod threshold;

pub use error::{SearchError, SearchWarning};
pub use evaluator::*;
pub use importance::*;
pub use loader::*;
pub use metrics::*;
pub use search::*;
pub use split::*;
pub use target::*;
pub use threshold::*;
