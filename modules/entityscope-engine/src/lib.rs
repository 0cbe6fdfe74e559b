//! Query fan-out and score aggregation for AI search visibility runs.
//!
//! A run expands one [`entityscope_common::AnalysisForm`] into targets,
//! crosses them with the selected personas, drives one model call per cell,
//! and reduces the resulting matrix into the visibility report.

pub mod aggregate;
pub mod export;
pub mod normalize;
pub mod orchestrator;
pub mod prompt;
pub mod targets;

pub use orchestrator::{
    analyze_single, run_analysis, ClaudePersonaQuery, PersonaQuery, RunSummary,
};
