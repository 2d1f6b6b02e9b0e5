//! Paperwatch arXiv - paper source backed by the arXiv Atom API
//!
//! Translates keyword queries into arXiv `search_query` syntax, pages
//! through results lazily and normalises Atom entries into
//! [`PaperRecord`](paperwatch_core::PaperRecord)s.
//!
//! # Example
//!
//! ```ignore
//! use paperwatch_arxiv::{ArxivConfig, ArxivSource};
//! use paperwatch_core::{SearchQuery, SourceAdapter};
//!
//! let source = ArxivSource::new(ArxivConfig::default());
//! let query = SearchQuery { pattern: "SLAM".into(), date_range: None, max_results: 10 };
//! for record in source.search(&query) {
//!     println!("{}", record?.title);
//! }
//! ```

pub mod client;
pub mod config;
pub mod parser;
pub mod query;

// Re-exports
pub use client::ArxivSource;
pub use config::ArxivConfig;
pub use parser::{AtomEntry, FeedPage, normalize_id, parse_feed};
pub use query::search_query;
