//! # Configuration
//!
//! The immutable configuration value of one pipeline run.
//!
//! A `Config` is built once at startup (defaults, then a TOML file, then
//! command-line overrides in the app layer), validated once with
//! [`Config::validate`], and then passed by reference into every stage.
//! No stage mutates it.
//!
//! ```toml
//! [params]
//! minimal_rating = 6.5
//! minimal_year = 1990
//! top = 20
//!
//! [dataset]
//! cache_dir = "dataset"
//! freshness_days = 7
//! include_crew = false
//! ```

use crate::filter::FilterCriteria;
use crate::primitives::{
    DEFAULT_BASE_URL, DEFAULT_CACHE_DIR, DEFAULT_FRESHNESS_DAYS, DEFAULT_MAXIMAL_COUNT,
    DEFAULT_MAXIMAL_RATING, DEFAULT_MAXIMAL_YEAR, DEFAULT_MINIMAL_COUNT, DEFAULT_MINIMAL_RATING,
    DEFAULT_MINIMAL_YEAR, DEFAULT_SAMPLING,
};
use crate::selection::SelectionParams;
use crate::GenreNetError;
use serde::Deserialize;
use std::path::PathBuf;

// =============================================================================
// PARAMS
// =============================================================================

/// Filtering and selection parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Params {
    pub minimal_rating: f64,
    pub maximal_rating: f64,
    pub minimal_year: i32,
    pub maximal_year: i32,
    pub minimal_count: u64,
    pub maximal_count: u64,
    pub top: usize,
    pub last: usize,
    pub sampling: f64,
    /// Seed for the sampling draw. `None` draws from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            minimal_rating: DEFAULT_MINIMAL_RATING,
            maximal_rating: DEFAULT_MAXIMAL_RATING,
            minimal_year: DEFAULT_MINIMAL_YEAR,
            maximal_year: DEFAULT_MAXIMAL_YEAR,
            minimal_count: DEFAULT_MINIMAL_COUNT,
            maximal_count: DEFAULT_MAXIMAL_COUNT,
            top: 0,
            last: 0,
            sampling: DEFAULT_SAMPLING,
            seed: None,
        }
    }
}

// =============================================================================
// DATASET SETTINGS
// =============================================================================

/// Where the dataset lives and how long a cached copy stays valid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatasetSettings {
    /// Directory holding the cached resource files and the timestamp.
    pub cache_dir: PathBuf,
    /// Maximum age of the cache, in days.
    pub freshness_days: u32,
    /// Fetch and cache the crew resource as well.
    pub include_crew: bool,
    /// Remote location the resource file names are appended to.
    pub base_url: String,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            freshness_days: DEFAULT_FRESHNESS_DAYS,
            include_crew: false,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

// =============================================================================
// CONFIG
// =============================================================================

/// Complete configuration of a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub params: Params,
    pub dataset: DatasetSettings,
}

impl Config {
    /// Check every option once, before any cache or network activity.
    ///
    /// Returns `GenreNetError::Configuration` naming the first offending
    /// option.
    pub fn validate(&self) -> Result<(), GenreNetError> {
        let p = &self.params;

        if !p.minimal_rating.is_finite() || !p.maximal_rating.is_finite() {
            return Err(GenreNetError::Configuration(
                "minimal_rating and maximal_rating must be finite".to_string(),
            ));
        }
        if p.minimal_rating > p.maximal_rating {
            return Err(GenreNetError::Configuration(format!(
                "minimal_rating {} exceeds maximal_rating {}",
                p.minimal_rating, p.maximal_rating
            )));
        }
        if p.minimal_year > p.maximal_year {
            return Err(GenreNetError::Configuration(format!(
                "minimal_year {} exceeds maximal_year {}",
                p.minimal_year, p.maximal_year
            )));
        }
        if p.minimal_count > p.maximal_count {
            return Err(GenreNetError::Configuration(format!(
                "minimal_count {} exceeds maximal_count {}",
                p.minimal_count, p.maximal_count
            )));
        }
        if !(p.sampling > 0.0 && p.sampling <= 1.0) {
            return Err(GenreNetError::Configuration(format!(
                "sampling must lie in (0, 1], got {}",
                p.sampling
            )));
        }
        if self.dataset.freshness_days == 0 {
            return Err(GenreNetError::Configuration(
                "freshness_days must be at least 1".to_string(),
            ));
        }
        if self.dataset.base_url.trim().is_empty() {
            return Err(GenreNetError::Configuration(
                "base_url must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Freshness window of the cache.
    #[must_use]
    pub fn freshness_window(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.dataset.freshness_days))
    }

    /// Row filter criteria derived from `[params]`.
    #[must_use]
    pub fn filter_criteria(&self) -> FilterCriteria {
        FilterCriteria {
            minimal_rating: self.params.minimal_rating,
            maximal_rating: self.params.maximal_rating,
            minimal_year: self.params.minimal_year,
            maximal_year: self.params.maximal_year,
            sampling: self.params.sampling,
            seed: self.params.seed,
        }
    }

    /// Edge selection parameters derived from `[params]`.
    #[must_use]
    pub fn selection_params(&self) -> SelectionParams {
        SelectionParams {
            minimal_count: self.params.minimal_count,
            maximal_count: self.params.maximal_count,
            top: self.params.top,
            last: self.params.last,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
