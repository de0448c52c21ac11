//! JSON file page store
//!
//! Each site gets `<store-dir>/<hostname>.json`, a pretty-printed JSON array
//! of `{title, url, content}` objects. Appends read the whole array, add the
//! record and write the array back through a temp file, holding the site's
//! lock for the full cycle.

use crate::storage::traits::{PageStore, StoreError, StoreResult};
use crate::storage::{AppendOutcome, PageRecord};
use crate::url::store_stem;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// JSON-file backed page store
///
/// Share one instance (behind an `Arc`) between every run that writes to the
/// same directory; the per-site locks only serialize writers that go through
/// the same instance.
pub struct JsonPageStore {
    root: PathBuf,
    dedupe: bool,
    site_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl JsonPageStore {
    /// Creates a store rooted at `root`; the directory is created on first append
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dedupe: false,
            site_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Creates the permanent variant that skips pages whose content
    /// fingerprint is already stored for the site
    pub fn with_dedupe(root: impl Into<PathBuf>) -> Self {
        Self {
            dedupe: true,
            ..Self::new(root)
        }
    }

    /// Returns true if this store deduplicates by content
    pub fn dedupes(&self) -> bool {
        self.dedupe
    }

    /// Directory holding the site files
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the store file for a site name
    pub fn path_for(&self, site: &str) -> PathBuf {
        self.root.join(format!("{}.json", site))
    }

    fn site_lock(&self, site: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .site_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks
            .entry(site.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

#[async_trait]
impl PageStore for JsonPageStore {
    async fn append(&self, record: PageRecord) -> StoreResult<AppendOutcome> {
        let site = store_stem(&record.url);
        let lock = self.site_lock(&site);
        let _guard = lock.lock().await;

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| io_error(&self.root, e))?;

        let path = self.path_for(&site);
        let mut records = read_records(&path).await?;

        if self.dedupe {
            let fingerprint = record.fingerprint();
            if records.iter().any(|r| r.fingerprint() == fingerprint) {
                tracing::debug!(
                    "Skipping {}: identical content already stored for {}",
                    record.url,
                    site
                );
                return Ok(AppendOutcome::Duplicate);
            }
        }

        records.push(record);
        write_records(&path, &records).await?;

        tracing::debug!(
            "Store {} now holds {} records",
            path.display(),
            records.len()
        );
        Ok(AppendOutcome::Appended)
    }

    async fn read_site(&self, site: &str) -> StoreResult<Vec<PageRecord>> {
        let lock = self.site_lock(site);
        let _guard = lock.lock().await;
        read_records(&self.path_for(site)).await
    }

    async fn list_sites(&self) -> StoreResult<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&self.root, e)),
        };

        let mut sites = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error(&self.root, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                sites.push(stem.to_string());
            }
        }

        sites.sort();
        Ok(sites)
    }
}

/// Reads a store file; a missing or empty file is an empty list
async fn read_records(path: &Path) -> StoreResult<Vec<PageRecord>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(io_error(path, e)),
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let records: Option<Vec<PageRecord>> =
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Decode {
            path: path.display().to_string(),
            source,
        })?;

    Ok(records.unwrap_or_default())
}

/// Writes the full record list, replacing the store file atomically
async fn write_records(path: &Path, records: &[PageRecord]) -> StoreResult<()> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records.serialize(&mut serializer)?;
    buf.push(b'\n');

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &buf)
        .await
        .map_err(|e| io_error(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| io_error(path, e))?;

    Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}
