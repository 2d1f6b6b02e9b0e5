//! arXiv adapter configuration (`[arxiv]` table)

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArxivConfig {
    /// Atom query endpoint
    pub base_url: String,
    /// Records requested per HTTP call
    pub page_size: usize,
    /// Minimum pause between two requests, in milliseconds
    pub request_delay_ms: u64,
}

impl Default for ArxivConfig {
    fn default() -> Self {
        Self {
            base_url: "http://export.arxiv.org/api/query".to_string(),
            page_size: 100,
            request_delay_ms: 3000,
        }
    }
}

impl ArxivConfig {
    pub const fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}
