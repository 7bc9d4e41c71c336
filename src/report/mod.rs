//! Report module - summarizing search results

pub mod summary;

pub use summary::*;
