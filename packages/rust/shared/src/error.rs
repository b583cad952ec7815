//! Error types for the Câmara explorer.
//!
//! Library crates use [`CamaraError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Remote resource kinds served by the legislative open-data API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Propositions,
    Proposition,
    Authors,
    Procedures,
    Themes,
    Polls,
    Poll,
    Votes,
}

impl Resource {
    /// Human-readable name used in error messages and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Propositions => "propositions",
            Self::Proposition => "proposition",
            Self::Authors => "proposition authors",
            Self::Procedures => "proposition procedures",
            Self::Themes => "proposition themes",
            Self::Polls => "proposition polls",
            Self::Poll => "poll details",
            Self::Votes => "poll votes",
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error type for all Câmara explorer operations.
#[derive(Debug, thiserror::Error)]
pub enum CamaraError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// The open-data API answered with a non-success status.
    #[error("failed to fetch {resource}: HTTP {status}")]
    Fetch { resource: Resource, status: u16 },

    /// Transport failure (connect, timeout, body read).
    #[error("network error: {0}")]
    Network(String),

    /// Malformed or unexpected payload.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Generative-text service failure, or required structured output missing.
    #[error("generation error: {0}")]
    Generation(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (identifier mismatch, invalid pipeline, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CamaraError>;

impl CamaraError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Non-success status for a resource.
    pub fn fetch(resource: Resource, status: u16) -> Self {
        Self::Fetch { resource, status }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = CamaraError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = CamaraError::fetch(Resource::Authors, 503);
        assert_eq!(
            err.to_string(),
            "failed to fetch proposition authors: HTTP 503"
        );

        let err = CamaraError::validation("expected proposition 7, got 8");
        assert!(err.to_string().contains("expected proposition 7"));
    }
}
