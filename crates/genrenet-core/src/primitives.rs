//! # Pipeline Primitives
//!
//! Hardcoded constants for the genrenet pipeline.
//!
//! These describe the shape of the upstream dataset files and the default
//! values of every configuration option. They are compiled into the binary
//! and are immutable at runtime; `Config::default()` is built from them.

// =============================================================================
// DATASET FORMAT
// =============================================================================

/// The marker the upstream dataset uses for a missing field.
pub const UNKNOWN_MARKER: &str = "\\N";

/// Stringified missing value that must never become a genre label.
pub const NAN_LABEL: &str = "nan";

/// Separator between genre labels inside one genre field.
pub const GENRE_DELIMITER: char = ',';

/// Column separator of the cached dataset files.
pub const COLUMN_SEPARATOR: char = '\t';

/// Column holding the title identifier in every resource.
pub const ID_COLUMN: &str = "tconst";

/// Column holding the release year in the titles resource.
pub const YEAR_COLUMN: &str = "startYear";

/// Column holding the genre list in the titles resource.
pub const GENRES_COLUMN: &str = "genres";

/// Column holding the average rating in the ratings resource.
pub const RATING_COLUMN: &str = "averageRating";

// =============================================================================
// CACHE LAYOUT
// =============================================================================

/// Name of the file holding the last successful refresh time.
pub const TIMESTAMP_FILE: &str = "timestamp.txt";

/// Suffix of the partial file a fetch decompresses into before it is
/// renamed onto its destination.
pub const PARTIAL_SUFFIX: &str = ".part";

/// Directory, inside the cache directory, a rebuild fetches into.
///
/// Its files are moved onto the live cache only once every resource of the
/// rebuild has been fetched.
pub const STAGING_DIR: &str = ".staging";

/// Default cache directory, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = "dataset";

/// Default remote location of the dataset files.
pub const DEFAULT_BASE_URL: &str = "https://datasets.imdbws.com";

/// Default freshness window, in days.
pub const DEFAULT_FRESHNESS_DAYS: u32 = 7;

// =============================================================================
// PARAMETER DEFAULTS
// =============================================================================

/// Default lower bound on the average rating (inclusive).
pub const DEFAULT_MINIMAL_RATING: f64 = 0.0;

/// Default upper bound on the average rating (inclusive).
pub const DEFAULT_MAXIMAL_RATING: f64 = 10.0;

/// Default lower bound on the release year (inclusive).
pub const DEFAULT_MINIMAL_YEAR: i32 = 0;

/// Default upper bound on the release year (inclusive).
pub const DEFAULT_MAXIMAL_YEAR: i32 = 9999;

/// Default lower bound on an edge's co-occurrence count (inclusive).
pub const DEFAULT_MINIMAL_COUNT: u64 = 0;

/// Default upper bound on an edge's co-occurrence count: unbounded.
pub const DEFAULT_MAXIMAL_COUNT: u64 = u64::MAX;

/// Default sampling fraction: every qualifying row is kept.
pub const DEFAULT_SAMPLING: f64 = 1.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_marker_is_backslash_n() {
        assert_eq!(UNKNOWN_MARKER, "\\N");
        assert_eq!(UNKNOWN_MARKER.len(), 2);
    }

    #[test]
    fn rating_bounds_cover_scale() {
        assert!(DEFAULT_MINIMAL_RATING < DEFAULT_MAXIMAL_RATING);
        assert!(DEFAULT_MINIMAL_YEAR < DEFAULT_MAXIMAL_YEAR);
    }
}
