//! Catalog manifest: format version, content hash and per-topic counts

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use paperwatch_core::PipelineError;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;

/// On-disk catalog format understood by this build.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

pub const MANIFEST_FILE: &str = "manifest.json";

/// Written next to `catalog.json` on every save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogManifest {
    pub format_version: u32,
    /// Blake3 hex hash of the catalog file bytes.
    pub content_hash: String,
    /// Topic name → entry count.
    pub topics: BTreeMap<String, usize>,
    pub written_at: DateTime<Utc>,
}

impl CatalogManifest {
    pub fn describe(catalog: &Catalog, catalog_bytes: &[u8], written_at: DateTime<Utc>) -> Self {
        Self {
            format_version: CURRENT_FORMAT_VERSION,
            content_hash: hash_hex(catalog_bytes),
            topics: catalog
                .topics()
                .map(|(name, entries)| (name.to_string(), entries.len()))
                .collect(),
            written_at,
        }
    }

    /// Short form of the content hash for log lines.
    pub fn short_hash(&self) -> &str {
        self.content_hash.get(..8).unwrap_or(&self.content_hash)
    }

    /// Write manifest to dir/manifest.json
    pub fn write_to(&self, dir: &Path) -> Result<(), PipelineError> {
        let path = dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PipelineError::persistence(&path, e))?;
        std::fs::write(&path, json).map_err(|e| PipelineError::persistence(&path, e))
    }

    /// Read manifest from dir/manifest.json, `None` if absent.
    pub fn read_from(dir: &Path) -> Result<Option<Self>, PipelineError> {
        let path = dir.join(MANIFEST_FILE);
        let json = match std::fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PipelineError::persistence(&path, e)),
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| PipelineError::persistence(&path, e))
    }
}

pub fn hash_hex(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(hash_hex(b"catalog"), hash_hex(b"catalog"));
        assert_ne!(hash_hex(b"catalog"), hash_hex(b"catalog2"));
    }

    #[test]
    fn read_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CatalogManifest::read_from(dir.path()).unwrap().is_none());
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let manifest = CatalogManifest::describe(&Catalog::new(), b"{}", now);
        manifest.write_to(dir.path()).unwrap();
        let back = CatalogManifest::read_from(dir.path()).unwrap().unwrap();
        assert_eq!(back, manifest);
        assert_eq!(back.short_hash().len(), 8);
    }

    #[test]
    fn corrupt_manifest_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), "not json").unwrap();
        let err = CatalogManifest::read_from(dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Persistence { .. }));
    }
}
