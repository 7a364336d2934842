// Selection engine.
// Filters the candidate pool, samples a random subset, and applies the pick.

use std::io::{BufRead, Write};

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::info;

use crate::cache::CacheDocument;
use crate::error::{Result, StarpickError};
use crate::github::Item;

/// Knobs for one selection round.
#[derive(Debug, Clone, Copy)]
pub struct SelectionOptions {
    /// How many items to offer.
    pub pool_size: usize,
    /// History bound: -1 keeps unlimited history and skips the history
    /// filter, 0 disables history entirely, N > 0 keeps the N most recent.
    pub max_history: i64,
    /// Whether the ignore list excludes candidates.
    pub ignore_enabled: bool,
}

/// A validated user pick: 0-based index plus the ignore modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pick {
    pub index: usize,
    pub ignore: bool,
}

/// Run one selection round against the document.
///
/// Returns the chosen item, or `None` when the user ends input, in which
/// case the document is left untouched. Never performs I/O beyond the
/// supplied reader/writer.
pub fn select<R: BufRead, W: Write>(
    document: &mut CacheDocument,
    options: &SelectionOptions,
    rng: &mut impl Rng,
    input: &mut R,
    output: &mut W,
) -> Result<Option<Item>> {
    let pool = candidate_pool(document, options);
    let sampled = sample(&pool, options.pool_size, rng)?;

    let Some(pick) = prompt(&sampled, options.pool_size, input, output)? else {
        return Ok(None);
    };

    let chosen = sampled[pick.index].clone();
    apply_pick(document, &chosen, pick.ignore, options.max_history);
    Ok(Some(chosen))
}

/// Compute the eligible candidate pool.
///
/// History filtering is skipped for the -1 sentinel and for disabled history.
/// When filtering would leave fewer than `pool_size` candidates, the history
/// has grown to cover the known item set; it is cleared and the full set is
/// used instead.
pub fn candidate_pool(document: &mut CacheDocument, options: &SelectionOptions) -> Vec<Item> {
    let mut candidates = document.items.clone();

    if options.max_history != -1 && options.max_history != 0 && !document.history.is_empty() {
        let filtered: Vec<Item> = candidates
            .iter()
            .filter(|item| !document.history.contains(&item.full_name))
            .cloned()
            .collect();

        if filtered.len() >= options.pool_size {
            candidates = filtered;
        } else {
            info!("history covers the known item set, clearing it");
            document.history.clear();
        }
    }

    if options.ignore_enabled {
        candidates.retain(|item| !document.ignore.contains(&item.full_name));
    }

    candidates
}

/// Draw `pool_size` distinct items uniformly without replacement.
pub fn sample(pool: &[Item], pool_size: usize, rng: &mut impl Rng) -> Result<Vec<Item>> {
    if pool.len() < pool_size {
        return Err(StarpickError::InsufficientPool {
            available: pool.len(),
            requested: pool_size,
        });
    }
    Ok(pool.choose_multiple(rng, pool_size).cloned().collect())
}

/// Parse one line of user input.
///
/// The integer part is a 1-based index into the sample; a fractional part of
/// `.1` sets the ignore modifier, with trailing zeros tolerated (`.10` reads
/// as `.1`). Anything non-numeric or out of range is rejected.
pub fn parse_pick(input: &str, pool_size: usize) -> Option<Pick> {
    let trimmed = input.trim();
    let (int_part, fraction) = match trimmed.split_once('.') {
        Some((int_part, fraction)) => (int_part, Some(fraction)),
        None => (trimmed, None),
    };

    let index: usize = int_part.parse().ok()?;
    if index < 1 || index > pool_size {
        return None;
    }

    let ignore = match fraction {
        None => false,
        Some(f) if f.is_empty() => false,
        Some(f) if f.chars().all(|c| c.is_ascii_digit()) => f.trim_end_matches('0') == "1",
        Some(_) => return None,
    };

    Some(Pick {
        index: index - 1,
        ignore,
    })
}

/// Present the sample and read picks until one is valid or input ends.
fn prompt<R: BufRead, W: Write>(
    sampled: &[Item],
    pool_size: usize,
    input: &mut R,
    output: &mut W,
) -> Result<Option<Pick>> {
    writeln!(output, "Which repository would you like to view today?")?;
    writeln!(output, "Note: add .1 to the number to add it to the ignore list")?;

    loop {
        for (i, item) in sampled.iter().enumerate() {
            writeln!(output, "{}. {}", i + 1, item.full_name)?;
        }
        write!(output, "> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        if let Some(pick) = parse_pick(&line, pool_size) {
            return Ok(Some(pick));
        }

        writeln!(
            output,
            "Select an item within the range of 1 and {}",
            pool_size
        )?;
    }
}

/// Record a pick in the document: ignore append when the modifier was set,
/// then history front-insert with tail truncation.
pub fn apply_pick(document: &mut CacheDocument, chosen: &Item, ignore: bool, max_history: i64) {
    if ignore {
        info!("adding {} to the ignore list", chosen.full_name);
        document.ignore.push(chosen.full_name.clone());
    }

    if max_history == 0 {
        return;
    }

    document.history.insert(0, chosen.full_name.clone());
    if max_history > 0 && document.history.len() > max_history as usize {
        document.history.truncate(max_history as usize);
    }
}
