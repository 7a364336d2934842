// Session driver.
// Orchestrates one invocation: load cache, fetch if needed, select, persist.

use std::io;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::cache::{CacheDocument, CacheStore, LoadedCache};
use crate::error::Result;
use crate::github::{GitHubClient, Item, ItemSource};
use crate::select::{self, SelectionOptions};

/// Printed when the user ends the session at the prompt, whether by
/// end-of-input or interrupt. Both are a clean, success-status exit.
pub const EXIT_MESSAGE: &str = "User exited the session!";

/// Fully resolved configuration for one invocation.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub account: String,
    pub token: Option<String>,
    pub cache_root: PathBuf,
    pub source: ItemSource,
    pub pool_size: usize,
    pub refresh: bool,
    pub max_history: i64,
    pub ignore_enabled: bool,
    pub max_results: usize,
}

/// Run one full fetch-select-persist session.
pub async fn run(config: &SessionConfig) -> Result<()> {
    let store = CacheStore::open(&config.cache_root, config.source, &config.account)?;

    let mut document = match store.load(&config.account)? {
        LoadedCache::Document(document) if !config.refresh => document,
        LoadedCache::Document(mut document) => {
            let items = fetch(config).await?;
            document.replace_items(items);
            store.save(&config.account, &mut document)?;
            document
        }
        LoadedCache::Foreign { stored_account } => {
            warn!(
                %stored_account,
                "not reusing ignore or history from a foreign cache"
            );
            let mut document = CacheDocument::new(&config.account, fetch(config).await?);
            store.save(&config.account, &mut document)?;
            document
        }
        LoadedCache::Missing => {
            let mut document = CacheDocument::new(&config.account, fetch(config).await?);
            store.save(&config.account, &mut document)?;
            document
        }
    };

    println!("Total amount of repositories: {}", document.items.len());

    let options = SelectionOptions {
        pool_size: config.pool_size,
        max_history: config.max_history,
        ignore_enabled: config.ignore_enabled,
    };

    let stdin = io::stdin();
    let chosen = select::select(
        &mut document,
        &options,
        &mut rand::thread_rng(),
        &mut stdin.lock(),
        &mut io::stdout(),
    )?;

    let Some(chosen) = chosen else {
        println!("{}", EXIT_MESSAGE);
        return Ok(());
    };

    store.save(&config.account, &mut document)?;
    open_in_browser(&chosen);

    println!("Done!");
    Ok(())
}

/// Fetch the full item set from GitHub. Items replace the cached set
/// wholesale; a rate-limited partial result is still a valid set.
async fn fetch(config: &SessionConfig) -> Result<Vec<Item>> {
    info!("requesting data from GitHub");
    let client = GitHubClient::new(config.token.as_deref())?;
    client
        .fetch_items(config.source, &config.account, config.max_results)
        .await
}

/// Hand the chosen item's URL to the default browser. Never fatal.
fn open_in_browser(chosen: &Item) {
    info!("opening {}", chosen.html_url);
    if let Err(err) = webbrowser::open(&chosen.html_url) {
        warn!("could not open browser: {}", err);
    }
}
