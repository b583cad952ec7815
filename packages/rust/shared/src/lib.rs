//! Shared types, error model, and configuration for the Câmara explorer.
//!
//! This crate is the foundation depended on by all other camara crates.
//! It provides:
//! - [`CamaraError`], the unified error type
//! - Domain types ([`Proposition`], [`Procedure`], [`Poll`], [`CompositeRecord`], ...)
//! - The [`Operation`] trait shared by fetchers and enrichers
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod operation;
pub mod themes;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AggregationPolicy, AppConfig, GenerativeConfig, MissingOutput, OpenDataConfig,
    PipelineConfig, config_dir, config_file_path, init_config, load_config, load_config_from,
    resolve_api_key,
};
pub use error::{CamaraError, Resource, Result};
pub use operation::Operation;
pub use themes::{THEMES, theme_label};
pub use types::{
    AffectedProposition, Approval, Author, CitedProposition, CompositeRecord, Deputy, Envelope,
    Explanation, Poll, PollDetail, PollId, PollTally, PollWithVotes, Procedure,
    ProcedureAnalysis, Proposition, PropositionFilter, PropositionId, PropositionStatus,
    PropositionSummary, Theme, Vote, proposition_type_label,
};
