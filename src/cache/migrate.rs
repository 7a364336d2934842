// One-time migration of the legacy multi-file cache layout.
// Folds cache.json, ignore.json, and selections.json into the unified document.

use std::fs;
use std::path::PathBuf;

use serde_json::Value;
use tracing::info;

use crate::error::Result;
use crate::github::Item;

use super::store::{CacheDocument, CacheStore};
use super::version::SchemaVersion;

const LEGACY_ITEMS: &str = "cache.json";
const LEGACY_IGNORE: &str = "ignore.json";
const LEGACY_HISTORY: &str = "selections.json";

/// Convert a pre-unification cache layout into the per-account document.
///
/// The legacy layout kept three content-keyed files in the cache root. When
/// the raw item file is present, all three are folded into one document for
/// `account` and then removed, so a second run is a no-op.
pub(super) fn migrate_legacy(store: &CacheStore, account: &str) -> Result<()> {
    let items_path = store.root().join(LEGACY_ITEMS);
    if !items_path.exists() {
        return Ok(());
    }

    info!("legacy cache layout detected, migrating to a unified document");

    let raw: Value = serde_json::from_str(&fs::read_to_string(&items_path)?)?;
    let (legacy_version, entries) = split_legacy_payload(raw);

    let items = if legacy_version < SchemaVersion::current() {
        entries.iter().filter_map(upgrade_entry).collect()
    } else {
        serde_json::from_value(Value::Array(entries))?
    };

    let mut document = CacheDocument::new(account, items);
    document.ignore = read_name_list(store.root().join(LEGACY_IGNORE))?;
    document.history = read_name_list(store.root().join(LEGACY_HISTORY))?;

    store.save(account, &mut document)?;

    for name in [LEGACY_ITEMS, LEGACY_IGNORE, LEGACY_HISTORY] {
        let path = store.root().join(name);
        if path.exists() {
            fs::remove_file(path)?;
        }
    }

    Ok(())
}

/// Split the legacy item payload into its stored version and raw entries.
/// Bare arrays predate version stamping and count as 0.0.0.
fn split_legacy_payload(raw: Value) -> (SchemaVersion, Vec<Value>) {
    match raw {
        Value::Object(mut map) => {
            let version = map
                .get("version")
                .and_then(Value::as_str)
                .and_then(|s| s.parse().ok())
                .unwrap_or_default();
            let entries = match map.remove("data") {
                Some(Value::Array(entries)) => entries,
                _ => Vec::new(),
            };
            (version, entries)
        }
        Value::Array(entries) => (SchemaVersion::default(), entries),
        _ => (SchemaVersion::default(), Vec::new()),
    }
}

/// Upgrade one legacy entry into a named-field item.
/// Handles bare qualified names and positional [id, name, url] triples.
fn upgrade_entry(entry: &Value) -> Option<Item> {
    match entry {
        Value::String(name) => Some(Item::from_name(name)),
        Value::Array(parts) => {
            let full_name = parts.get(1)?.as_str()?.to_string();
            let html_url = parts
                .get(2)
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("https://github.com/{}", full_name));
            Some(Item {
                id: parts.first().and_then(Value::as_u64),
                full_name,
                html_url,
            })
        }
        Value::Object(_) => serde_json::from_value(entry.clone()).ok(),
        _ => None,
    }
}

/// Read a legacy name list (ignore or history), tolerating both bare strings
/// and positional triples.
fn read_name_list(path: PathBuf) -> Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let raw: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
    let entries = match raw {
        Value::Array(entries) => entries,
        _ => return Ok(Vec::new()),
    };

    Ok(entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(name) => Some(name.clone()),
            Value::Array(parts) => parts.get(1).and_then(Value::as_str).map(str::to_string),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::LoadedCache;
    use crate::github::ItemSource;
    use tempfile::TempDir;

    fn write_legacy_files(root: &std::path::Path) {
        fs::write(
            root.join(LEGACY_ITEMS),
            r#"{"version": "0.5.0", "data": ["a/one", [42, "a/two", "https://github.com/a/two"]]}"#,
        )
        .unwrap();
        fs::write(root.join(LEGACY_IGNORE), r#"["a/ignored"]"#).unwrap();
        fs::write(root.join(LEGACY_HISTORY), r#"["a/two", "a/one"]"#).unwrap();
    }

    #[test]
    fn test_migration_unifies_and_removes_legacy_files() {
        let temp_dir = TempDir::new().unwrap();
        write_legacy_files(temp_dir.path());

        let store = CacheStore::open(temp_dir.path(), ItemSource::Stars, "ddkasa").unwrap();

        assert!(!temp_dir.path().join(LEGACY_ITEMS).exists());
        assert!(!temp_dir.path().join(LEGACY_IGNORE).exists());
        assert!(!temp_dir.path().join(LEGACY_HISTORY).exists());

        match store.load("ddkasa").unwrap() {
            LoadedCache::Document(doc) => {
                assert_eq!(doc.items.len(), 2);
                assert_eq!(doc.items[0].full_name, "a/one");
                assert_eq!(doc.items[0].id, None);
                assert_eq!(doc.items[1].id, Some(42));
                assert_eq!(doc.ignore, vec!["a/ignored"]);
                assert_eq!(doc.history, vec!["a/two", "a/one"]);
            }
            other => panic!("expected document, got {:?}", other),
        }
    }

    #[test]
    fn test_migration_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        write_legacy_files(temp_dir.path());

        let store = CacheStore::open(temp_dir.path(), ItemSource::Stars, "ddkasa").unwrap();
        let first = match store.load("ddkasa").unwrap() {
            LoadedCache::Document(doc) => doc,
            other => panic!("expected document, got {:?}", other),
        };

        // Second construction: legacy files are gone, nothing changes.
        let store = CacheStore::open(temp_dir.path(), ItemSource::Stars, "ddkasa").unwrap();
        let second = match store.load("ddkasa").unwrap() {
            LoadedCache::Document(doc) => doc,
            other => panic!("expected document, got {:?}", other),
        };

        assert_eq!(first.items, second.items);
        assert_eq!(first.ignore, second.ignore);
        assert_eq!(first.history, second.history);
    }

    #[test]
    fn test_migration_tolerates_missing_side_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(LEGACY_ITEMS), r#"["a/one"]"#).unwrap();

        let store = CacheStore::open(temp_dir.path(), ItemSource::Stars, "ddkasa").unwrap();

        match store.load("ddkasa").unwrap() {
            LoadedCache::Document(doc) => {
                assert_eq!(doc.items.len(), 1);
                assert!(doc.ignore.is_empty());
                assert!(doc.history.is_empty());
            }
            other => panic!("expected document, got {:?}", other),
        }
    }
}
