//! # Row Filter
//!
//! Reduces the joined title+rating table to the working subset.
//!
//! The filter is a single pass that builds a new collection; the input is
//! never mutated. Predicates are applied in a fixed order:
//!
//! 1. records with an unknown year, rating or genre field are dropped
//! 2. records outside `[minimal_year, maximal_year]` are dropped
//! 3. records outside `[minimal_rating, maximal_rating]` are dropped
//! 4. a uniform sample of `round(sampling * qualifying)` records is kept
//!
//! Sampling always runs last, on the records that passed every range
//! predicate, and keeps the surviving records in input order.

use crate::TitleRecord;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;

// =============================================================================
// CRITERIA
// =============================================================================

/// Bounds and sampling fraction of the row filter. All bounds are inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub minimal_rating: f64,
    pub maximal_rating: f64,
    pub minimal_year: i32,
    pub maximal_year: i32,
    /// Fraction in (0, 1] of qualifying records to retain.
    pub sampling: f64,
    /// Seed for the sampling draw. `None` uses the thread RNG.
    pub seed: Option<u64>,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        crate::Config::default().filter_criteria()
    }
}

impl FilterCriteria {
    fn classify(&self, record: &TitleRecord) -> Verdict {
        if record.has_unknown_field() {
            return Verdict::Unknown;
        }
        let (Some(year), Some(rating)) = (record.start_year, record.average_rating) else {
            return Verdict::Unknown;
        };
        if !(self.minimal_year..=self.maximal_year).contains(&year) {
            return Verdict::Year;
        }
        // NaN is outside every range
        if !(self.minimal_rating..=self.maximal_rating).contains(&rating) {
            return Verdict::Rating;
        }
        Verdict::Keep
    }

    /// Number of records the sample keeps out of `qualifying`.
    #[must_use]
    pub fn sample_size(&self, qualifying: usize) -> usize {
        if self.sampling >= 1.0 {
            return qualifying;
        }
        let size = (self.sampling * qualifying as f64).round() as usize;
        size.min(qualifying)
    }
}

enum Verdict {
    Keep,
    Unknown,
    Year,
    Rating,
}

// =============================================================================
// REPORT
// =============================================================================

/// Diagnostic counts of one filter pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterReport {
    /// Records handed to the filter.
    pub total: usize,
    /// Dropped for an unknown year, rating or genre field.
    pub dropped_unknown: usize,
    /// Dropped for a year outside the bounds.
    pub dropped_year: usize,
    /// Dropped for a rating outside the bounds.
    pub dropped_rating: usize,
    /// Qualifying records left out of the sample.
    pub dropped_sampling: usize,
    /// Records in the working subset.
    pub retained: usize,
}

impl FilterReport {
    /// Total number of dropped records.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped_unknown + self.dropped_year + self.dropped_rating + self.dropped_sampling
    }

    /// True if filtering removed every record.
    ///
    /// This is the empty-result warning: it is non-fatal and later stages
    /// accept an empty working subset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.retained == 0
    }
}

// =============================================================================
// FILTER
// =============================================================================

/// Apply `criteria` to `rows`, returning the working subset and its report.
pub fn filter(rows: &[TitleRecord], criteria: &FilterCriteria) -> (Vec<TitleRecord>, FilterReport) {
    let mut report = FilterReport {
        total: rows.len(),
        ..FilterReport::default()
    };

    let mut qualifying = Vec::with_capacity(rows.len());
    for record in rows {
        match criteria.classify(record) {
            Verdict::Keep => qualifying.push(record),
            Verdict::Unknown => report.dropped_unknown += 1,
            Verdict::Year => report.dropped_year += 1,
            Verdict::Rating => report.dropped_rating += 1,
        }
    }

    let qualifying_len = qualifying.len();
    let amount = criteria.sample_size(qualifying_len);
    let retained: Vec<TitleRecord> = if amount == qualifying.len() {
        qualifying.into_iter().cloned().collect()
    } else {
        let mut picked = match criteria.seed {
            Some(seed) => {
                let mut rng = StdRng::seed_from_u64(seed);
                index::sample(&mut rng, qualifying.len(), amount).into_vec()
            }
            None => index::sample(&mut rand::rng(), qualifying.len(), amount).into_vec(),
        };
        picked.sort_unstable();
        picked.into_iter().map(|i| qualifying[i].clone()).collect()
    };

    report.retained = retained.len();
    report.dropped_sampling = qualifying_len - report.retained;

    (retained, report)
}

// =============================================================================
// TESTS
// =============================================================================
