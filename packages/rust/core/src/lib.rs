//! Aggregation and enrichment pipeline for legislative records.
//!
//! This crate ties the open-data fetchers and the generative client together
//! into named views: stages of concurrent fetches merged into one record,
//! optionally followed by generated explanations.

pub mod aggregator;
pub mod enrichment;
pub mod ordering;
pub mod pipeline;

#[cfg(test)]
mod testing;

pub use aggregator::{Aggregator, Collected, PartFailure};
pub use enrichment::{ExplanationEnricher, ProcedureAnalysisEnricher};
pub use pipeline::{
    Orchestrator, PipelineDescription, ProgressReporter, SilentProgress, Stage, Step, View,
};
