//! paperwatch-catalog: keyword-topic paper catalog
//!
//! Turns topic configuration into source queries, filters and
//! deduplicates the returned records, merges them into the persisted
//! per-topic catalog and prunes entries outside the retention policy.
//!
//! ```text
//! Topic ─► SourceAdapter::search ─► RecordFilter ─► dedup_records
//!       ─► merge_records ─► clean_entries ─► CatalogStore::save
//! ```

pub mod catalog;
pub mod dedup;
pub mod filter;
pub mod manifest;
pub mod merge;
pub mod pipeline;
pub mod render;
pub mod retention;
pub mod store;
pub mod summary;
pub mod topic;

pub use catalog::Catalog;
pub use dedup::dedup_records;
pub use filter::RecordFilter;
pub use manifest::CatalogManifest;
pub use merge::{MergeOutcome, merge_records};
pub use pipeline::{CleanupMode, RunOptions, refresh_catalog};
pub use render::{RenderOptions, RenderStyle, render_markdown};
pub use retention::{RetentionPolicy, clean_entries};
pub use store::CatalogStore;
pub use summary::{RunSummary, TopicOutcome, TopicReport, TopicStats};
pub use topic::{FilterSpec, TopicSpec, parse_date, validate_topics, validate_window};
