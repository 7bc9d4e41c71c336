//! featkeep: Feature Count Search Library
//!
//! A library for deciding how many importance-ranked features a trained
//! classifier needs, using a coarse-then-fine search with a
//! confidence-adjusted acceptance threshold.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
