//! # Pipeline Module
//!
//! Orchestrates a full organizing run.
//!
//! ## Pipeline Stages
//! 1. **Scan** - File every photo under its canonical key
//! 2. **Plan** - Split each key's photos into unique and redundant files
//! 3. **Move** - Relocate files to their planned names
//!
//! Planning and moving alternate key by key by default; see
//! [`ExecutionMode`] for planning everything up front.

mod executor;

pub use executor::{ExecutionMode, Pipeline, PipelineBuilder, PipelineConfig, PipelineResult};
