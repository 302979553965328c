//! # Genre Aggregator
//!
//! Per-genre frequencies and pairwise co-occurrence counts over the working
//! subset.
//!
//! The two passes run in order: [`count_genres`] discovers the genre
//! universe, then [`count_combinations`] registers every pair of that
//! universe with count zero and adds one per record carrying both genres.
//!
//! Complexity: O(G²) for the pair registration (G = distinct genres) plus
//! O(k²) per record (k = genres on that record, bounded by the taxonomy).

use crate::primitives::NAN_LABEL;
use crate::{CoOccurrenceCount, GenreCount, GenrePair, TitleRecord};
use std::collections::BTreeSet;

/// Frequency of every genre label across `rows`.
///
/// Records with an unknown genre field contribute nothing. The `"nan"`
/// label is stripped from the result however it entered.
pub fn count_genres(rows: &[TitleRecord]) -> GenreCount {
    let mut counts = GenreCount::new();
    for record in rows {
        for genre in record.genre_labels() {
            counts.increment(genre);
        }
    }
    counts.remove(NAN_LABEL);
    counts
}

/// Co-occurrence count of every pair of the genre universe.
///
/// The result holds exactly `G * (G - 1) / 2` entries for `G` genres in
/// `genre_count`, including pairs that never co-occur. Pairs touching a
/// genre outside the universe are ignored.
pub fn count_combinations(rows: &[TitleRecord], genre_count: &GenreCount) -> CoOccurrenceCount {
    let mut pairs = CoOccurrenceCount::new();

    let universe = genre_count.genres();
    for (i, a) in universe.iter().enumerate() {
        for b in &universe[i + 1..] {
            if let Some(pair) = GenrePair::new(a, b) {
                pairs.register(pair);
            }
        }
    }

    for record in rows {
        let labels = record.genre_labels();
        if labels.len() < 2 {
            continue;
        }
        for (i, a) in labels.iter().enumerate() {
            for b in &labels[i + 1..] {
                if let Some(pair) = GenrePair::new(a, b) {
                    pairs.increment(&pair);
                }
            }
        }
    }

    pairs
}

/// Number of within-record genre pairs across `rows`, restricted to
/// distinct genres of the universe.
///
/// This is the sum every `count_combinations` result must add up to.
pub fn within_record_pairs(rows: &[TitleRecord], genre_count: &GenreCount) -> u64 {
    rows.iter()
        .map(|record| {
            let distinct: BTreeSet<&str> = record
                .genre_labels()
                .iter()
                .map(String::as_str)
                .filter(|g| genre_count.contains(g))
                .collect();
            let k = distinct.len() as u64;
            k * k.saturating_sub(1) / 2
        })
        .sum()
}

// =============================================================================
// TESTS
// =============================================================================
