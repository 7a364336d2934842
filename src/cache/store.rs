// Cache store for the unified per-account document.
// Handles JSON round-tripping, staleness warnings, and atomic writes.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::github::{Item, ItemSource};

use super::migrate;
use super::version::SchemaVersion;

/// The one cache document tracked per account.
///
/// `history` is most-recent-first; `ignore` keeps insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheDocument {
    pub account: String,
    #[serde(rename = "version", default)]
    pub schema_version: SchemaVersion,
    #[serde(rename = "date")]
    pub fetched_at: DateTime<Utc>,
    #[serde(rename = "data")]
    pub items: Vec<Item>,
    #[serde(default)]
    pub ignore: Vec<String>,
    #[serde(default)]
    pub history: Vec<String>,
}

impl CacheDocument {
    /// Create a fresh document from a completed fetch.
    pub fn new(account: &str, items: Vec<Item>) -> Self {
        Self {
            account: account.to_string(),
            schema_version: SchemaVersion::current(),
            fetched_at: Utc::now(),
            items,
            ignore: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Replace the item set wholesale. A fetch fully supersedes the previous
    /// set; ignore and history are untouched.
    pub fn replace_items(&mut self, items: Vec<Item>) {
        self.items = items;
    }
}

/// Outcome of loading the cache for an account.
#[derive(Debug)]
pub enum LoadedCache {
    /// No document file exists for the account.
    Missing,
    /// A document exists but belongs to a different account.
    Foreign { stored_account: String },
    /// The account's document.
    Document(CacheDocument),
}

/// Filesystem store for cache documents under one cache root.
pub struct CacheStore {
    root: PathBuf,
    source: ItemSource,
}

impl CacheStore {
    /// Open a store, running the one-time legacy migration for the account.
    pub fn open(root: &Path, source: ItemSource, account: &str) -> Result<Self> {
        let store = Self {
            root: root.to_path_buf(),
            source,
        };
        migrate::migrate_legacy(&store, account)?;
        Ok(store)
    }

    pub(super) fn document_path(&self, account: &str) -> PathBuf {
        self.root.join(self.source.cache_file(account))
    }

    pub(super) fn root(&self) -> &Path {
        &self.root
    }

    /// Load the cached document for an account.
    ///
    /// A schema version mismatch is advisory only; an account mismatch is
    /// signalled so the caller can treat the document as untrusted. Neither
    /// deletes anything.
    pub fn load(&self, account: &str) -> Result<LoadedCache> {
        let path = self.document_path(account);
        if !path.exists() {
            return Ok(LoadedCache::Missing);
        }

        let contents = fs::read_to_string(&path)?;
        let document: CacheDocument = serde_json::from_str(&contents)?;

        info!(
            "cache last refreshed on the {}",
            document.fetched_at.date_naive()
        );

        let current = SchemaVersion::current();
        if document.schema_version != current {
            warn!(
                "cache is from a different version. current: {} - stored: {}",
                current, document.schema_version
            );
        }

        if document.account != account {
            warn!(
                stored = %document.account,
                requested = %account,
                "cached document belongs to a different account"
            );
            return Ok(LoadedCache::Foreign {
                stored_account: document.account,
            });
        }

        Ok(LoadedCache::Document(document))
    }

    /// Persist a document for an account, stamping the running schema version
    /// and the save time. The write is atomic via temp-file-then-rename.
    pub fn save(&self, account: &str, document: &mut CacheDocument) -> Result<()> {
        document.account = account.to_string();
        document.schema_version = SchemaVersion::current();
        document.fetched_at = Utc::now();

        let path = self.document_path(account);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(document)?;
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(root: &Path) -> CacheStore {
        CacheStore::open(root, ItemSource::Stars, "ddkasa").unwrap()
    }

    fn sample_document() -> CacheDocument {
        let mut doc = CacheDocument::new(
            "ddkasa",
            vec![Item::from_name("a/one"), Item::from_name("a/two")],
        );
        doc.ignore.push("a/ignored".to_string());
        doc.history.push("a/one".to_string());
        doc
    }

    #[test]
    fn test_load_missing() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(temp_dir.path());

        assert!(matches!(store.load("ddkasa").unwrap(), LoadedCache::Missing));
    }

    #[test]
    fn test_save_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(temp_dir.path());

        let mut doc = sample_document();
        store.save("ddkasa", &mut doc).unwrap();

        match store.load("ddkasa").unwrap() {
            LoadedCache::Document(loaded) => {
                assert_eq!(loaded.items, doc.items);
                assert_eq!(loaded.ignore, doc.ignore);
                assert_eq!(loaded.history, doc.history);
                assert_eq!(loaded.schema_version, SchemaVersion::current());
            }
            other => panic!("expected document, got {:?}", other),
        }
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(temp_dir.path());

        let mut doc = sample_document();
        store.save("ddkasa", &mut doc).unwrap();

        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .filter(|name| name.ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_account_mismatch_is_signalled() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(temp_dir.path());

        let mut doc = sample_document();
        store.save("ddkasa", &mut doc).unwrap();

        // Same file queried for another account name.
        fs::rename(
            store.document_path("ddkasa"),
            store.document_path("someone"),
        )
        .unwrap();

        match store.load("someone").unwrap() {
            LoadedCache::Foreign { stored_account } => assert_eq!(stored_account, "ddkasa"),
            other => panic!("expected foreign cache, got {:?}", other),
        }
    }

    #[test]
    fn test_old_schema_version_still_loads() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(temp_dir.path());

        let raw = serde_json::json!({
            "account": "ddkasa",
            "version": "0.9.0",
            "date": Utc::now().to_rfc3339(),
            "data": [{"full_name": "a/one", "html_url": "https://github.com/a/one"}],
            "ignore": [],
            "history": [],
        });
        fs::write(store.document_path("ddkasa"), raw.to_string()).unwrap();

        match store.load("ddkasa").unwrap() {
            LoadedCache::Document(doc) => {
                assert_eq!(doc.schema_version.to_string(), "0.9.0");
                assert_eq!(doc.items.len(), 1);
            }
            other => panic!("expected document, got {:?}", other),
        }
    }

    #[test]
    fn test_save_rewrites_version_and_account() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(temp_dir.path());

        let mut doc = sample_document();
        doc.schema_version = "0.1.0".parse().unwrap();
        doc.account = "stale".to_string();
        store.save("ddkasa", &mut doc).unwrap();

        assert_eq!(doc.account, "ddkasa");
        assert_eq!(doc.schema_version, SchemaVersion::current());
    }
}
