// GitHub API response types and item-source configuration.
// Defines the cached item record and the endpoints it is fetched from.

use serde::{Deserialize, Serialize};

/// One remote repository, as cached and presented for selection.
///
/// Uniqueness is by `full_name` ("owner/name"); the id and URL are carried
/// alongside it. Serialized by field name, never positionally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// GitHub numeric id. Absent for items upgraded from a legacy cache.
    #[serde(default)]
    pub id: Option<u64>,
    pub full_name: String,
    pub html_url: String,
}

impl Item {
    /// Build an item from a bare qualified name, deriving its URL.
    pub fn from_name(full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        let html_url = format!("https://github.com/{}", full_name);
        Self {
            id: None,
            full_name,
            html_url,
        }
    }
}

/// Raw repository object as returned by the GitHub listing endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRepository {
    pub id: u64,
    pub full_name: String,
    pub html_url: String,
}

impl From<RawRepository> for Item {
    fn from(raw: RawRepository) -> Self {
        Self {
            id: Some(raw.id),
            full_name: raw.full_name,
            html_url: raw.html_url,
        }
    }
}

/// Which listing an account's items come from.
///
/// Carries the endpoint template and the cache-file naming for that listing,
/// so one client/store pair serves both variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemSource {
    /// Repositories the account has starred.
    #[default]
    Stars,
    /// Repositories the account owns.
    Repos,
}

impl ItemSource {
    /// API path for one page of the listing.
    pub fn endpoint(&self, account: &str) -> String {
        match self {
            ItemSource::Stars => format!("/users/{}/starred", account),
            ItemSource::Repos => format!("/users/{}/repos", account),
        }
    }

    /// File name of the unified cache document for this listing.
    pub fn cache_file(&self, account: &str) -> String {
        match self {
            ItemSource::Stars => format!("{}_cache.json", account),
            ItemSource::Repos => format!("{}_repo_cache.json", account),
        }
    }
}
