//! Checks and plans derived from a loaded configuration.
//!
//! This module contains the cross-field consistency checks, the registry of
//! known analysis routines, and the run plan resolving a configuration into
//! the files and steps of one pipeline run.

mod consistency;
mod modules;
mod plan;

pub use consistency::{Finding, Severity, ValidationReport, check_consistency};
pub use modules::{AnalysisModule, MODULES, find_module};
pub use plan::{DataSource, PipelineStep, RunPlan};
