//! # Core Type Definitions
//!
//! This module contains all core types of the genrenet pipeline:
//! - Input records (`TitleRecord`)
//! - Count mappings (`GenreCount`, `CoOccurrenceCount`, `GenrePair`)
//! - Error types (`GenreNetError`)
//!
//! ## Determinism Guarantees
//!
//! - Count mappings use `BTreeMap` so that iteration order never depends on
//!   hashing.
//! - `GenreCount` additionally remembers first-seen order, which is the
//!   node order of the rendered graph.
//! - Counters use saturating arithmetic to prevent overflow.

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

// =============================================================================
// TITLE RECORD
// =============================================================================

/// One media title joined with its rating.
///
/// `None` stands for the dataset's "unknown" marker. Genre labels are kept
/// in dataset order with duplicates removed, so a record never pairs a
/// genre with itself.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleRecord {
    /// The title identifier shared by the titles and ratings resources.
    pub id: String,
    /// Release year, if known.
    pub start_year: Option<i32>,
    /// Average rating on the 0-10 scale, if known.
    pub average_rating: Option<f64>,
    /// Genre labels, if known.
    pub genres: Option<Vec<String>>,
}

impl TitleRecord {
    /// Create a new record.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        start_year: Option<i32>,
        average_rating: Option<f64>,
        genres: Option<Vec<String>>,
    ) -> Self {
        Self {
            id: id.into(),
            start_year,
            average_rating,
            genres,
        }
    }

    /// True if any field the filter relies on is unknown.
    #[must_use]
    pub fn has_unknown_field(&self) -> bool {
        self.start_year.is_none() || self.average_rating.is_none() || self.genres.is_none()
    }

    /// The known genre labels, or an empty slice.
    #[must_use]
    pub fn genre_labels(&self) -> &[String] {
        self.genres.as_deref().unwrap_or(&[])
    }
}

// =============================================================================
// GENRE PAIR
// =============================================================================

/// An unordered pair of distinct genre labels.
///
/// The pair is canonicalized on construction: the lexically smaller label is
/// always `first`. Two pairs built from the same labels in either order are
/// equal, so a mapping keyed by `GenrePair` can never hold both orderings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GenrePair {
    first: String,
    second: String,
}

impl GenrePair {
    /// Build the canonical pair of two labels.
    ///
    /// Returns `None` when both labels are the same genre.
    #[must_use]
    pub fn new(a: &str, b: &str) -> Option<Self> {
        match a.cmp(b) {
            std::cmp::Ordering::Less => Some(Self {
                first: a.to_string(),
                second: b.to_string(),
            }),
            std::cmp::Ordering::Greater => Some(Self {
                first: b.to_string(),
                second: a.to_string(),
            }),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// The lexically smaller label.
    #[must_use]
    pub fn first(&self) -> &str {
        &self.first
    }

    /// The lexically larger label.
    #[must_use]
    pub fn second(&self) -> &str {
        &self.second
    }
}

impl std::fmt::Display for GenrePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.first, self.second)
    }
}

// =============================================================================
// GENRE COUNT
// =============================================================================

/// Frequency of every genre label across a record set.
///
/// Iteration follows first-seen order; lookups go through a `BTreeMap`.
/// Equality compares the frequencies only, so two counts built from
/// permutations of the same records are equal.
#[derive(Debug, Clone, Default)]
pub struct GenreCount {
    order: Vec<String>,
    counts: BTreeMap<String, u64>,
}

impl GenreCount {
    /// Create an empty count.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one occurrence of `genre`.
    pub fn increment(&mut self, genre: &str) {
        match self.counts.get_mut(genre) {
            Some(count) => *count = count.saturating_add(1),
            None => {
                self.order.push(genre.to_string());
                self.counts.insert(genre.to_string(), 1);
            }
        }
    }

    /// Remove a label entirely. Returns its frequency if it was present.
    pub fn remove(&mut self, genre: &str) -> Option<u64> {
        let removed = self.counts.remove(genre)?;
        self.order.retain(|g| g != genre);
        Some(removed)
    }

    /// Frequency of `genre`, zero when absent.
    #[must_use]
    pub fn get(&self, genre: &str) -> u64 {
        self.counts.get(genre).copied().unwrap_or(0)
    }

    /// True if `genre` is part of the genre universe.
    #[must_use]
    pub fn contains(&self, genre: &str) -> bool {
        self.counts.contains_key(genre)
    }

    /// Number of distinct genres.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True if no genre was seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Genre labels in first-seen order.
    #[must_use]
    pub fn genres(&self) -> &[String] {
        &self.order
    }

    /// `(genre, frequency)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.order
            .iter()
            .map(|genre| (genre.as_str(), self.get(genre)))
    }
}

impl PartialEq for GenreCount {
    fn eq(&self, other: &Self) -> bool {
        self.counts == other.counts
    }
}

impl Eq for GenreCount {}

// =============================================================================
// CO-OCCURRENCE COUNT
// =============================================================================

/// Number of records carrying both genres of each pair.
///
/// Keys are canonical `GenrePair`s, so lookups are order-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoOccurrenceCount {
    pairs: BTreeMap<GenrePair, u64>,
}

impl CoOccurrenceCount {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pair with count zero if it is not present yet.
    pub fn register(&mut self, pair: GenrePair) {
        self.pairs.entry(pair).or_insert(0);
    }

    /// Add one co-occurrence to a registered pair.
    ///
    /// Returns `false` and leaves the mapping untouched when the pair was
    /// never registered.
    pub fn increment(&mut self, pair: &GenrePair) -> bool {
        match self.pairs.get_mut(pair) {
            Some(count) => {
                *count = count.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Count of the pair `(a, b)` in either order.
    #[must_use]
    pub fn get(&self, a: &str, b: &str) -> Option<u64> {
        let pair = GenrePair::new(a, b)?;
        self.pairs.get(&pair).copied()
    }

    /// Number of registered pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True if no pair is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.pairs
            .values()
            .fold(0u64, |acc, count| acc.saturating_add(*count))
    }

    /// `(pair, count)` entries in canonical pair order.
    pub fn iter(&self) -> impl Iterator<Item = (&GenrePair, u64)> + '_ {
        self.pairs.iter().map(|(pair, count)| (pair, *count))
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the genrenet pipeline.
///
/// - No silent failures
/// - Use `Result<T, GenreNetError>` for fallible operations
/// - Every variant names the resource or option involved
#[derive(Debug, Error)]
pub enum GenreNetError {
    /// The remote fetch of a resource did not succeed.
    #[error("Transport error for '{resource}': {status}")]
    Transport {
        /// Name of the resource being fetched.
        resource: String,
        /// HTTP status or connection failure description.
        status: String,
    },

    /// The fetched content of a resource could not be decompressed.
    #[error("Decode error for '{resource}': {reason}")]
    Decode {
        /// Name of the resource being decompressed.
        resource: String,
        /// Decoder failure description.
        reason: String,
    },

    /// Configuration input is missing or malformed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A cached resource file could not be parsed.
    #[error("Parse error in '{resource}' line {line}: {reason}")]
    Parse {
        /// Name of the resource being read.
        resource: String,
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },

    /// The persisted cache timestamp could not be read or written.
    #[error("Timestamp error: {0}")]
    Timestamp(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),
}

// =============================================================================
// TESTS
// =============================================================================
