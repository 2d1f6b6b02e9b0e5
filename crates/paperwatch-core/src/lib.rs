//! Paperwatch Core - Common infrastructure for keyword-driven paper catalogs
//!
//! This crate provides the shared data model (topics, paper records,
//! catalog entries), the [`SourceAdapter`] capability trait that paper
//! sources implement, the pipeline error taxonomy, and the ambient
//! plumbing (HTTP, retry, logging, progress, shutdown) used by the
//! source and catalog crates.

pub mod error;
pub mod http;
pub mod logging;
pub mod model;
pub mod progress;
pub mod retry;
pub mod shutdown;
pub mod source;

// Re-exports for convenience
pub use error::PipelineError;
pub use http::{HttpConfig, SHARED_RUNTIME, get_text, http_client, http_config, set_http_config};
pub use logging::{IndicatifLogger, init_logging};
pub use model::{CatalogEntry, DateRange, KeywordFilter, PaperRecord, Topic, field};
pub use progress::{ProgressContext, fmt_num};
pub use retry::retry_with_backoff;
pub use shutdown::{install_signal_handlers, is_shutdown_requested, shutdown_flag};
pub use source::{RecordStream, SearchQuery, SourceAdapter, SourceError};
