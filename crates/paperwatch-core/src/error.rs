//! Error taxonomy for catalog refresh runs

use std::path::PathBuf;

use crate::source::SourceError;

/// Error raised while refreshing the catalog.
///
/// Structural failures ([`ConfigInvalid`](Self::ConfigInvalid),
/// [`Persistence`](Self::Persistence)) abort the whole run before any stored
/// state changes. [`SourceUnavailable`](Self::SourceUnavailable) only skips
/// the affected topic and [`RecordMalformed`](Self::RecordMalformed) only
/// drops the affected record.
#[derive(Debug)]
pub enum PipelineError {
    /// Topic or date configuration rejected before any fetch.
    ConfigInvalid(String),
    /// A source query failed.
    SourceUnavailable { query: String, source: SourceError },
    /// A single record lacks required fields.
    RecordMalformed { id: Option<String>, reason: String },
    /// Catalog could not be read or written.
    Persistence {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigInvalid(msg) => write!(f, "invalid configuration: {msg}"),
            Self::SourceUnavailable { query, source } => {
                write!(f, "source unavailable for {query}: {source}")
            }
            Self::RecordMalformed {
                id: Some(id),
                reason,
            } => write!(f, "malformed record {id}: {reason}"),
            Self::RecordMalformed { id: None, reason } => write!(f, "malformed record: {reason}"),
            Self::Persistence { path, source } => {
                write!(f, "catalog persistence failed ({}): {source}", path.display())
            }
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SourceUnavailable { source, .. } => Some(source),
            Self::Persistence { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl PipelineError {
    /// Whether the error must abort the whole run.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::ConfigInvalid(_) | Self::Persistence { .. })
    }

    pub fn persistence(path: impl Into<PathBuf>, source: impl Into<std::io::Error>) -> Self {
        Self::Persistence {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn malformed(id: Option<&str>, reason: impl Into<String>) -> Self {
        Self::RecordMalformed {
            id: id.filter(|s| !s.is_empty()).map(str::to_string),
            reason: reason.into(),
        }
    }
}
