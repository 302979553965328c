//! # Pipeline
//!
//! One run, end to end:
//!
//! ```text
//! ensure_fresh -> load_working_table -> filter -> count_genres
//!              -> count_combinations -> build_graph
//! ```
//!
//! [`analyze`] is the pure part after the cache gate; it reads the cached
//! files and never touches the network.

use crate::aggregate::{count_combinations, count_genres};
use crate::cache::{CacheManager, CacheOutcome};
use crate::dataset::{Catalogue, Resource, load_working_table};
use crate::fetcher::Transport;
use crate::filter::{FilterCriteria, FilterReport, filter};
use crate::selection::{GraphDescription, SelectionParams, build_graph};
use crate::{CoOccurrenceCount, Config, GenreCount, GenreNetError};

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    /// Rows of the working table before filtering.
    pub loaded: usize,
    pub filter_report: FilterReport,
    pub genre_count: GenreCount,
    pub co_occurrence: CoOccurrenceCount,
    pub graph: GraphDescription,
}

/// Load, filter, count and select from an already fresh cache.
pub fn analyze(
    catalogue: &Catalogue,
    criteria: &FilterCriteria,
    selection: &SelectionParams,
) -> Result<PipelineRun, GenreNetError> {
    let titles = catalogue.require(Resource::Titles)?;
    let ratings = catalogue.require(Resource::Ratings)?;

    let table = load_working_table(titles, ratings)?;
    let (rows, filter_report) = filter(&table, criteria);

    let genre_count = count_genres(&rows);
    let co_occurrence = count_combinations(&rows, &genre_count);
    let graph = build_graph(&genre_count, &co_occurrence, selection);

    Ok(PipelineRun {
        loaded: table.len(),
        filter_report,
        genre_count,
        co_occurrence,
        graph,
    })
}

/// Validate `config`, gate the cache, then analyze.
pub fn run<T: Transport>(
    config: &Config,
    transport: T,
) -> Result<(CacheOutcome, PipelineRun), GenreNetError> {
    config.validate()?;
    let cache = CacheManager::new(Catalogue::from_settings(&config.dataset), transport);
    let outcome = cache.ensure_fresh(config.freshness_window())?;
    let run = analyze(
        cache.catalogue(),
        &config.filter_criteria(),
        &config.selection_params(),
    )?;
    Ok((outcome, run))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatasetSettings;
    use std::fs;

    fn catalogue(titles: &str, ratings: &str) -> (tempfile::TempDir, Catalogue) {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("titles.tsv"), titles).expect("titles");
        fs::write(dir.path().join("ratings.tsv"), ratings).expect("ratings");
        let settings = DatasetSettings {
            cache_dir: dir.path().to_path_buf(),
            ..DatasetSettings::default()
        };
        let catalogue = Catalogue::from_settings(&settings);
        (dir, catalogue)
    }

    const TITLES: &str = "tconst\ttitleType\tstartYear\tgenres\n\
        tt1\tmovie\t2001\tAction,Comedy\n\
        tt2\tmovie\t2002\tAction,Drama\n\
        tt3\tmovie\t2003\tComedy,Drama\n\
        tt4\tmovie\t\\N\tDrama\n\
        tt5\tmovie\t2005\tHorror\n";

    const RATINGS: &str = "tconst\taverageRating\tnumVotes\n\
        tt1\t7.0\t10\n\
        tt2\t6.0\t10\n\
        tt3\t8.0\t10\n\
        tt4\t5.0\t10\n";

    #[test]
    fn triangle_end_to_end() {
        let (_dir, catalogue) = catalogue(TITLES, RATINGS);
        let run = analyze(
            &catalogue,
            &FilterCriteria::default(),
            &SelectionParams::default(),
        )
        .expect("analyze");

        // tt5 has no rating, tt4 has an unknown year
        assert_eq!(run.loaded, 4);
        assert_eq!(run.filter_report.dropped_unknown, 1);
        assert_eq!(run.filter_report.retained, 3);

        assert_eq!(run.genre_count.get("Action"), 2);
        assert_eq!(run.genre_count.get("Comedy"), 2);
        assert_eq!(run.genre_count.get("Drama"), 2);
        assert_eq!(run.co_occurrence.len(), 3);
        assert_eq!(run.graph.node_count(), 3);
        assert_eq!(run.graph.edge_count(), 3);
        assert!(run.graph.edges().iter().all(|e| e.weight == 1));
    }

    #[test]
    fn rating_window_narrows_universe() {
        let (_dir, catalogue) = catalogue(TITLES, RATINGS);
        let criteria = FilterCriteria {
            minimal_rating: 7.0,
            ..FilterCriteria::default()
        };
        let run = analyze(&catalogue, &criteria, &SelectionParams::default()).expect("analyze");

        assert_eq!(run.filter_report.retained, 2);
        assert_eq!(run.filter_report.dropped_rating, 1);
        assert_eq!(run.co_occurrence.get("Comedy", "Drama"), Some(1));
        assert_eq!(run.co_occurrence.get("Action", "Drama"), Some(0));
    }

    #[test]
    fn missing_cache_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = DatasetSettings {
            cache_dir: dir.path().to_path_buf(),
            ..DatasetSettings::default()
        };
        let err = analyze(
            &Catalogue::from_settings(&settings),
            &FilterCriteria::default(),
            &SelectionParams::default(),
        )
        .expect_err("no files");
        assert!(matches!(err, GenreNetError::Io(_)));
    }
}
