//! Capability interface for paper sources
//!
//! The catalog pipeline only sees [`SourceAdapter`]; concrete network
//! clients live in their own crates and tests use in-memory fakes.

use crate::error::PipelineError;
use crate::model::{DateRange, PaperRecord};

/// Error talking to a paper source
#[derive(Debug)]
pub enum SourceError {
    /// HTTP error with optional status code
    Http {
        status: Option<u16>,
        message: String,
    },
    /// I/O error
    Io(std::io::Error),
    /// Response body could not be understood
    Parse(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http {
                status: Some(s),
                message,
            } => write!(f, "HTTP {s}: {message}"),
            Self::Http {
                status: None,
                message,
            } => write!(f, "HTTP error: {message}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl SourceError {
    /// Create HTTP error from reqwest error
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        Self::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            // No status = connection/timeout failure
            Self::Http { status, .. } => match status {
                None => true,
                Some(s) => *s == 429 || *s >= 500,
            },
            Self::Io(_) => true,
            Self::Parse(_) => false,
        }
    }
}

impl From<std::io::Error> for SourceError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// One keyword query against a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Keyword pattern as configured (not yet translated to source syntax).
    pub pattern: String,
    pub date_range: Option<DateRange>,
    /// Upper bound on records the source should return.
    pub max_results: usize,
}

impl std::fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.date_range {
            Some(r) if !r.is_unbounded() => write!(f, "'{}' ({r})", self.pattern),
            _ => write!(f, "'{}'", self.pattern),
        }
    }
}

/// Lazy sequence of search results.
///
/// Items are `Ok(record)`, `Err(RecordMalformed)` for a single unusable
/// record (the sequence continues), or `Err(SourceUnavailable)` after which
/// the sequence is over and everything already yielded must be discarded.
pub type RecordStream<'a> = Box<dyn Iterator<Item = Result<PaperRecord, PipelineError>> + 'a>;

/// A searchable paper source.
pub trait SourceAdapter {
    /// Short name used in log lines.
    fn name(&self) -> &str;

    /// Run one keyword query. Network work may happen lazily while the
    /// returned stream is consumed.
    fn search<'a>(&'a self, query: &SearchQuery) -> RecordStream<'a>;
}

impl<S: SourceAdapter + ?Sized> SourceAdapter for &S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn search<'a>(&'a self, query: &SearchQuery) -> RecordStream<'a> {
        (**self).search(query)
    }
}
