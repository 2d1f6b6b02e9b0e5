//! Durable catalog storage
//!
//! Layout:
//! ```text
//! {data_dir}/
//! ├── catalog.json       # { "format_version": 1, "topics": { name: [entries] } }
//! ├── catalog.json.tmp   # staging file, renamed over catalog.json on save
//! └── manifest.json      # CatalogManifest
//! ```
//!
//! A save either fully replaces the previous catalog or leaves it untouched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use paperwatch_core::PipelineError;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::manifest::{CURRENT_FORMAT_VERSION, CatalogManifest, hash_hex};

const CATALOG_FILE: &str = "catalog.json";

fn default_format_version() -> u32 {
    CURRENT_FORMAT_VERSION
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default = "default_format_version")]
    format_version: u32,
    #[serde(default)]
    topics: Catalog,
}

#[derive(Serialize)]
struct CatalogFileRef<'a> {
    format_version: u32,
    topics: &'a Catalog,
}

/// Outcome of [`CatalogStore::verify`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    pub topics: usize,
    pub entries: usize,
    /// `None` when there is no manifest to compare against.
    pub hash_matches: Option<bool>,
    pub problems: Vec<String>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty() && self.hash_matches != Some(false)
    }
}

/// Catalog files under one data directory.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    base: PathBuf,
}

impl CatalogStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.base.join(CATALOG_FILE)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.base.join(crate::manifest::MANIFEST_FILE)
    }

    fn tmp_path(&self) -> PathBuf {
        self.base.join(format!("{CATALOG_FILE}.tmp"))
    }

    /// Read raw catalog bytes, `None` when the file does not exist.
    fn read_bytes(&self) -> Result<Option<Vec<u8>>, PipelineError> {
        let path = self.catalog_path();
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PipelineError::persistence(path, e)),
        }
    }

    fn parse(&self, bytes: &[u8]) -> Result<Catalog, PipelineError> {
        let path = self.catalog_path();
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Catalog::new());
        }
        let file: CatalogFile =
            serde_json::from_slice(bytes).map_err(|e| PipelineError::persistence(&path, e))?;
        if file.format_version > CURRENT_FORMAT_VERSION {
            return Err(PipelineError::persistence(
                path,
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "unsupported format version {} (this build reads up to {CURRENT_FORMAT_VERSION})",
                        file.format_version
                    ),
                ),
            ));
        }
        Ok(file.topics)
    }

    /// Load the catalog. A missing or empty file yields an empty catalog.
    pub fn load(&self) -> Result<Catalog, PipelineError> {
        let Some(bytes) = self.read_bytes()? else {
            log::debug!("store: no catalog at {}, starting empty", self.catalog_path().display());
            return Ok(Catalog::new());
        };
        let catalog = self.parse(&bytes)?;

        match CatalogManifest::read_from(&self.base) {
            Ok(Some(manifest)) if manifest.content_hash != hash_hex(&bytes) => {
                log::warn!(
                    "store: catalog content does not match manifest hash {} (edited by hand?)",
                    manifest.short_hash()
                );
            }
            Ok(_) => {}
            Err(e) => log::warn!("store: ignoring unreadable manifest: {e}"),
        }

        log::debug!(
            "store: loaded {} entries across {} topics",
            catalog.total_entries(),
            catalog.topic_count()
        );
        Ok(catalog)
    }

    /// Persist the catalog atomically, then refresh the manifest.
    ///
    /// Once the catalog file is in place the save has succeeded: a manifest
    /// that cannot be written is logged and left stale, and `load` warns
    /// about the mismatch.
    pub fn save(&self, catalog: &Catalog) -> Result<CatalogManifest, PipelineError> {
        fs::create_dir_all(&self.base).map_err(|e| PipelineError::persistence(&self.base, e))?;

        let file = CatalogFileRef {
            format_version: CURRENT_FORMAT_VERSION,
            topics: catalog,
        };
        let json = serde_json::to_vec_pretty(&file)
            .map_err(|e| PipelineError::persistence(self.catalog_path(), e))?;

        let tmp = self.tmp_path();
        fs::write(&tmp, &json).map_err(|e| PipelineError::persistence(&tmp, e))?;
        if let Err(e) = fs::rename(&tmp, self.catalog_path()) {
            let _ = fs::remove_file(&tmp);
            return Err(PipelineError::persistence(self.catalog_path(), e));
        }

        let manifest = CatalogManifest::describe(catalog, &json, Utc::now());
        if let Err(e) = manifest.write_to(&self.base) {
            log::warn!("store: catalog saved but manifest not updated: {e}");
        }
        log::info!(
            "store: saved {} entries across {} topics ({})",
            catalog.total_entries(),
            catalog.topic_count(),
            manifest.short_hash()
        );
        Ok(manifest)
    }

    /// Check the stored catalog against its manifest and its own invariants.
    pub fn verify(&self) -> Result<VerifyReport, PipelineError> {
        let Some(bytes) = self.read_bytes()? else {
            return Ok(VerifyReport::default());
        };
        let catalog = self.parse(&bytes)?;
        let mut report = VerifyReport {
            topics: catalog.topic_count(),
            entries: catalog.total_entries(),
            hash_matches: None,
            problems: catalog.check_invariants(),
        };

        if let Some(manifest) = CatalogManifest::read_from(&self.base)? {
            report.hash_matches = Some(manifest.content_hash == hash_hex(&bytes));
            for (name, entries) in catalog.topics() {
                match manifest.topics.get(name) {
                    Some(&n) if n == entries.len() => {}
                    Some(&n) => report.problems.push(format!(
                        "topic '{name}': manifest records {n} entries, catalog has {}",
                        entries.len()
                    )),
                    None => report
                        .problems
                        .push(format!("topic '{name}': missing from manifest")),
                }
            }
        }
        Ok(report)
    }
}
