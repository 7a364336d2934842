// Paginated fetching of repository listings.
// Accumulates a deduplicated, ordered item set with a soft result cap.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::{Result, StarpickError};

use super::client::GitHubClient;
use super::types::{Item, ItemSource, RawRepository};

const PAGE_SIZE: u32 = 30;

impl GitHubClient {
    /// Fetch all items of a listing for an account.
    ///
    /// Pages from 1 until the server returns an empty page. `max_results > 0`
    /// is a soft cap: accumulation stops once reached, but the page that
    /// crossed it is never re-requested. A rate-limit signal mid-pagination
    /// ends the fetch with whatever has been collected so far.
    pub async fn fetch_items(
        &self,
        source: ItemSource,
        account: &str,
        max_results: usize,
    ) -> Result<Vec<Item>> {
        let endpoint = source.endpoint(account);
        let mut items = Vec::new();
        let mut seen = HashSet::new();

        let mut page = 1;
        loop {
            debug!(page, "requesting listing page");
            let raw = match self.get_page(&endpoint, page, PAGE_SIZE).await {
                Ok(raw) => raw,
                Err(StarpickError::RateLimited) => {
                    warn!(
                        collected = items.len(),
                        "rate limit exceeded, stopping requests"
                    );
                    break;
                }
                Err(err) => return Err(err),
            };
            if raw.is_empty() {
                break;
            }

            if accumulate(&mut items, &mut seen, raw, max_results) {
                break;
            }
            page += 1;
        }

        Ok(items)
    }
}

/// Fold one page into the accumulated set, deduplicating by qualified name.
/// Returns true once `cap` (> 0) items have been collected.
fn accumulate(
    items: &mut Vec<Item>,
    seen: &mut HashSet<String>,
    page: Vec<RawRepository>,
    cap: usize,
) -> bool {
    for raw in page {
        if !seen.insert(raw.full_name.clone()) {
            continue;
        }
        items.push(raw.into());
        if cap > 0 && items.len() >= cap {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: u64, name: &str) -> RawRepository {
        RawRepository {
            id,
            full_name: name.to_string(),
            html_url: format!("https://github.com/{}", name),
        }
    }

    #[test]
    fn test_accumulate_dedups_by_qualified_name() {
        let mut items = Vec::new();
        let mut seen = HashSet::new();

        let done = accumulate(
            &mut items,
            &mut seen,
            vec![raw(1, "a/one"), raw(2, "a/two"), raw(3, "a/one")],
            0,
        );

        assert!(!done);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].full_name, "a/one");
        assert_eq!(items[1].full_name, "a/two");
    }

    #[test]
    fn test_accumulate_stops_at_cap() {
        let mut items = Vec::new();
        let mut seen = HashSet::new();

        let page = (0..30).map(|i| raw(i, &format!("a/{}", i))).collect();
        let done = accumulate(&mut items, &mut seen, page, 10);

        assert!(done);
        assert_eq!(items.len(), 10);
    }

    #[test]
    fn test_accumulate_cap_disabled_with_zero() {
        let mut items = Vec::new();
        let mut seen = HashSet::new();

        let page = (0..30).map(|i| raw(i, &format!("a/{}", i))).collect();
        let done = accumulate(&mut items, &mut seen, page, 0);

        assert!(!done);
        assert_eq!(items.len(), 30);
    }

    #[test]
    fn test_accumulate_preserves_insertion_order_across_pages() {
        let mut items = Vec::new();
        let mut seen = HashSet::new();

        accumulate(&mut items, &mut seen, vec![raw(1, "a/one")], 0);
        accumulate(
            &mut items,
            &mut seen,
            vec![raw(1, "a/one"), raw(2, "a/two")],
            0,
        );

        let names: Vec<_> = items.iter().map(|i| i.full_name.as_str()).collect();
        assert_eq!(names, ["a/one", "a/two"]);
    }
}
