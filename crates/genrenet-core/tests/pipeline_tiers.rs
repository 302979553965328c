//! # Pipeline Tier Tests (T0-T3)
//!
//! If ANY tier fails, a run's graph cannot be trusted.
//!
//! ## Tiers
//! - T0: Configuration Gate
//! - T1: Cache Freshness
//! - T2: Counting Scenarios
//! - T3: End-to-End Runs

use flate2::Compression;
use flate2::write::GzEncoder;
use genrenet_core::{
    CacheManager, Catalogue, Config, DatasetHandle, DatasetSettings, GenreNetError, Resource,
    Transport, run,
};
use std::cell::Cell;
use std::io::Write;
use std::path::Path;

const TITLES: &str = "tconst\ttitleType\tprimaryTitle\tstartYear\tgenres\n\
    tt1\tmovie\tOne\t2001\tAction,Comedy\n\
    tt2\tmovie\tTwo\t2002\tAction,Drama\n\
    tt3\tmovie\tThree\t2003\tComedy,Drama\n\
    tt4\tmovie\tFour\t2004\t\\N\n\
    tt5\tmovie\tFive\t1950\tDrama,Film-Noir\n";

const RATINGS: &str = "tconst\taverageRating\tnumVotes\n\
    tt1\t7.5\t100\n\
    tt2\t6.1\t100\n\
    tt3\t8.2\t100\n\
    tt4\t5.0\t100\n\
    tt5\t9.9\t100\n";

/// Serves fixed gzip payloads and counts requests.
struct MemoryTransport {
    titles: String,
    ratings: String,
    requests: Cell<usize>,
    fail: Cell<bool>,
}

impl MemoryTransport {
    fn new(titles: &str, ratings: &str) -> Self {
        Self {
            titles: titles.to_string(),
            ratings: ratings.to_string(),
            requests: Cell::new(0),
            fail: Cell::new(false),
        }
    }
}

impl Transport for MemoryTransport {
    fn get(&self, handle: &DatasetHandle) -> Result<Vec<u8>, GenreNetError> {
        self.requests.set(self.requests.get() + 1);
        if self.fail.get() {
            return Err(GenreNetError::Transport {
                resource: handle.name().to_string(),
                status: "connection refused".to_string(),
            });
        }
        let body = match handle.resource() {
            Resource::Titles => &self.titles,
            Resource::Ratings => &self.ratings,
            Resource::Crew => "tconst\tdirectors\twriters\n",
        };
        let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(body.as_bytes()).expect("encode");
        Ok(encoder.finish().expect("finish"))
    }
}

fn config(dir: &Path) -> Config {
    Config {
        dataset: DatasetSettings {
            cache_dir: dir.to_path_buf(),
            ..DatasetSettings::default()
        },
        ..Config::default()
    }
}

// =============================================================================
// TIER T0: CONFIGURATION GATE
// =============================================================================

mod t0_configuration_gate {
    use super::*;

    /// T0.1: Invalid configuration fails before any fetch.
    #[test]
    fn invalid_config_never_fetches() {
        let dir = tempfile::tempdir().expect("tempdir");
        let transport = MemoryTransport::new(TITLES, RATINGS);
        let mut config = config(dir.path());
        config.params.sampling = 0.0;

        let err = run(&config, &transport).expect_err("invalid");
        assert!(matches!(err, GenreNetError::Configuration(_)));
        assert_eq!(transport.requests.get(), 0);
        assert!(!dir.path().join("timestamp.txt").exists());
    }

    /// T0.2: Inverted bounds are rejected.
    #[test]
    fn inverted_year_bounds_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = config(dir.path());
        config.params.minimal_year = 2010;
        config.params.maximal_year = 2000;
        assert!(matches!(
            config.validate(),
            Err(GenreNetError::Configuration(_))
        ));
    }
}

// =============================================================================
// TIER T1: CACHE FRESHNESS
// =============================================================================

mod t1_cache_freshness {
    use super::*;

    /// T1.1: A second run inside the window does not fetch again.
    #[test]
    fn second_run_uses_cache() {
        let dir = tempfile::tempdir().expect("tempdir");
        let transport = MemoryTransport::new(TITLES, RATINGS);
        let config = config(dir.path());

        let (outcome, _) = run(&config, &transport).expect("first");
        assert!(outcome.was_rebuilt());
        assert_eq!(transport.requests.get(), 2);

        let (outcome, _) = run(&config, &transport).expect("second");
        assert!(!outcome.was_rebuilt());
        assert_eq!(transport.requests.get(), 2);
    }

    /// T1.2: Crew is fetched only when configured.
    #[test]
    fn crew_is_optional() {
        let dir = tempfile::tempdir().expect("tempdir");
        let transport = MemoryTransport::new(TITLES, RATINGS);
        let mut config = config(dir.path());
        config.dataset.include_crew = true;

        run(&config, &transport).expect("run");
        assert_eq!(transport.requests.get(), 3);
        assert!(dir.path().join("crew.tsv").is_file());
    }

    /// T1.3: A failing rebuild of an empty cache surfaces the transport error.
    #[test]
    fn failing_transport_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let transport = MemoryTransport::new(TITLES, RATINGS);
        transport.fail.set(true);

        let err = run(&config(dir.path()), &transport).expect_err("offline");
        assert!(matches!(err, GenreNetError::Transport { ref resource, .. } if resource == "titles"));
        assert!(!dir.path().join("timestamp.txt").exists());
    }

    /// T1.4: force_delete refetches even inside the window.
    #[test]
    fn force_delete_refetches() {
        let dir = tempfile::tempdir().expect("tempdir");
        let transport = MemoryTransport::new(TITLES, RATINGS);
        let config = config(dir.path());
        let cache = CacheManager::new(Catalogue::from_settings(&config.dataset), &transport);

        cache.ensure_fresh(config.freshness_window()).expect("populate");
        let outcome = cache
            .force_delete(config.freshness_window())
            .expect("force");
        assert!(outcome.was_rebuilt());
        assert_eq!(transport.requests.get(), 4);
    }
}

// =============================================================================
// TIER T2: COUNTING SCENARIOS
// =============================================================================

mod t2_counting {
    use super::*;

    /// T2.1: Three two-genre records form a triangle of weight-1 edges.
    #[test]
    fn triangle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let transport = MemoryTransport::new(TITLES, RATINGS);
        let mut config = config(dir.path());
        config.params.minimal_year = 2000;

        let (_, result) = run(&config, &transport).expect("run");
        assert_eq!(result.genre_count.get("Action"), 2);
        assert_eq!(result.genre_count.get("Comedy"), 2);
        assert_eq!(result.genre_count.get("Drama"), 2);
        assert!(!result.genre_count.contains("Film-Noir"));
        assert_eq!(result.graph.edge_count(), 3);
        assert_eq!(result.filter_report.dropped_unknown, 1);
        assert_eq!(result.filter_report.dropped_year, 1);
    }

    /// T2.2: A count floor above every pair leaves nodes without edges.
    #[test]
    fn floor_removes_edges() {
        let dir = tempfile::tempdir().expect("tempdir");
        let transport = MemoryTransport::new(TITLES, RATINGS);
        let mut config = config(dir.path());
        config.params.minimal_year = 2000;
        config.params.minimal_count = 2;

        let (_, result) = run(&config, &transport).expect("run");
        assert_eq!(result.graph.node_count(), 3);
        assert_eq!(result.graph.edge_count(), 0);
    }

    /// T2.3: Filters that reject everything give an empty graph, not an error.
    #[test]
    fn empty_result_is_not_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let transport = MemoryTransport::new(TITLES, RATINGS);
        let mut config = config(dir.path());
        config.params.minimal_rating = 10.0;

        let (_, result) = run(&config, &transport).expect("run");
        assert!(result.genre_count.is_empty());
        assert!(result.co_occurrence.is_empty());
        assert!(result.graph.is_empty());
    }
}

// =============================================================================
// TIER T3: END-TO-END RUNS
// =============================================================================

mod t3_end_to_end {
    use super::*;

    /// T3.1: Identical input and configuration give identical graphs.
    #[test]
    fn runs_are_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let transport = MemoryTransport::new(TITLES, RATINGS);
        let mut config = config(dir.path());
        config.params.top = 2;

        let (_, first) = run(&config, &transport).expect("first");
        let (_, second) = run(&config, &transport).expect("second");
        assert_eq!(first.graph, second.graph);
        assert_eq!(first.genre_count, second.genre_count);
        assert_eq!(first.co_occurrence, second.co_occurrence);
    }

    /// T3.2: Seeded sampling is reproducible.
    #[test]
    fn seeded_sampling_is_reproducible() {
        let dir = tempfile::tempdir().expect("tempdir");
        let transport = MemoryTransport::new(TITLES, RATINGS);
        let mut config = config(dir.path());
        config.params.sampling = 0.5;
        config.params.seed = Some(42);

        let (_, first) = run(&config, &transport).expect("first");
        let (_, second) = run(&config, &transport).expect("second");
        assert_eq!(first.filter_report.retained, 2);
        assert_eq!(first.genre_count, second.genre_count);
    }

    /// T3.3: A malformed cached row is a parse error naming the line.
    #[test]
    fn malformed_row_is_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let broken = "tconst\ttitleType\tprimaryTitle\tstartYear\tgenres\n\
            tt1\tmovie\tOne\tsoon\tAction\n";
        let transport = MemoryTransport::new(broken, RATINGS);

        let err = run(&config(dir.path()), &transport).expect_err("bad year");
        assert!(matches!(err, GenreNetError::Parse { line: 2, .. }));
    }
}
