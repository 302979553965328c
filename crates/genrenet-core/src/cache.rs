//! # Cache Manager
//!
//! Decides whether the local dataset copy is fresh enough and rebuilds it
//! otherwise.
//!
//! ## Cache Layout
//!
//! ```text
//! <cache_dir>/
//!   titles.tsv
//!   ratings.tsv
//!   crew.tsv          (only with include_crew)
//!   timestamp.txt     RFC 3339, time of the last complete rebuild
//! ```
//!
//! ## Rebuild Protocol
//!
//! 1. every resource is fetched into `<cache_dir>/.staging/`
//! 2. only when all fetches succeeded are the staged files moved onto the
//!    live cache
//! 3. only then is `timestamp.txt` rewritten
//!
//! A failure in step 1 leaves live files and timestamp untouched, so the
//! next run retries the full rebuild. The timestamp is never newer than
//! the files it describes.
//!
//! The manager assumes a single writer per cache directory; embedders that
//! run several pipelines against one directory must serialize them.

use crate::dataset::{Catalogue, Resource};
use crate::fetcher::{DatasetFetcher, Transport};
use crate::primitives::{STAGING_DIR, TIMESTAMP_FILE};
use crate::GenreNetError;
use chrono::{DateTime, Duration, NaiveDateTime, SecondsFormat, Utc};
use std::fs;
use std::path::{Path, PathBuf};

// =============================================================================
// CACHE STATE
// =============================================================================

/// Time of the last successful full refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheState {
    pub refreshed_at: DateTime<Utc>,
}

impl CacheState {
    /// Parse the contents of the timestamp file.
    ///
    /// Accepts RFC 3339 and the space-separated `YYYY-MM-DD HH:MM:SS[.f]`
    /// form of older caches, read as UTC.
    pub fn parse(raw: &str) -> Result<Self, GenreNetError> {
        let raw = raw.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Self {
                refreshed_at: parsed.with_timezone(&Utc),
            });
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
            .map(|naive| Self {
                refreshed_at: naive.and_utc(),
            })
            .map_err(|e| GenreNetError::Timestamp(format!("cannot parse '{}': {}", raw, e)))
    }

    /// Sortable textual form written to the timestamp file.
    #[must_use]
    pub fn render(&self) -> String {
        self.refreshed_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Age of the cache at `now`.
    #[must_use]
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        now - self.refreshed_at
    }
}

// =============================================================================
// OUTCOMES
// =============================================================================

/// Why a cache was considered stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    /// No timestamp file exists.
    MissingTimestamp,
    /// The timestamp file exists but could not be read or parsed.
    UnreadableTimestamp(String),
    /// The cache is older than the freshness window.
    Expired { age: Duration },
    /// A configured resource file is missing.
    MissingFile(Resource),
}

impl std::fmt::Display for StaleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StaleReason::MissingTimestamp => write!(f, "dataset has no timestamp"),
            StaleReason::UnreadableTimestamp(e) => write!(f, "timestamp unreadable ({})", e),
            StaleReason::Expired { age } => {
                write!(f, "dataset is too old ({} days)", age.num_days())
            }
            StaleReason::MissingFile(resource) => {
                write!(f, "cached '{}' file is missing", resource)
            }
        }
    }
}

/// What `ensure_fresh` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheOutcome {
    /// The cache was fresh and left alone.
    Fresh(CacheState),
    /// The cache was stale and has been rebuilt.
    Rebuilt {
        reason: StaleReason,
        state: CacheState,
    },
}

impl CacheOutcome {
    #[must_use]
    pub fn state(&self) -> CacheState {
        match self {
            CacheOutcome::Fresh(state) | CacheOutcome::Rebuilt { state, .. } => *state,
        }
    }

    #[must_use]
    pub fn was_rebuilt(&self) -> bool {
        matches!(self, CacheOutcome::Rebuilt { .. })
    }
}

/// Snapshot of the cache for status reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStatus {
    pub state: Option<CacheState>,
    /// Age of the cache at the time of the report.
    pub age: Option<Duration>,
    pub stale: Option<StaleReason>,
    /// Every configured resource with whether its file is present.
    pub files: Vec<(Resource, PathBuf, bool)>,
}

// =============================================================================
// CACHE MANAGER
// =============================================================================

/// Freshness gate in front of the dataset fetcher.
#[derive(Debug)]
pub struct CacheManager<T: Transport> {
    catalogue: Catalogue,
    fetcher: DatasetFetcher<T>,
}

impl<T: Transport> CacheManager<T> {
    #[must_use]
    pub fn new(catalogue: Catalogue, transport: T) -> Self {
        Self {
            catalogue,
            fetcher: DatasetFetcher::new(transport),
        }
    }

    #[must_use]
    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    fn timestamp_path(&self) -> PathBuf {
        self.catalogue.cache_dir().join(TIMESTAMP_FILE)
    }

    fn staging_dir(&self) -> PathBuf {
        self.catalogue.cache_dir().join(STAGING_DIR)
    }

    /// Read the persisted timestamp. `Ok(None)` when there is none.
    pub fn read_state(&self) -> Result<Option<CacheState>, GenreNetError> {
        let path = self.timestamp_path();
        match fs::read_to_string(&path) {
            Ok(raw) => CacheState::parse(&raw).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GenreNetError::Timestamp(format!(
                "cannot read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// `None` if the cache is fresh at `now`, otherwise why it is stale.
    pub fn assess_at(&self, freshness_window: Duration, now: DateTime<Utc>) -> Option<StaleReason> {
        let state = match self.read_state() {
            Ok(Some(state)) => state,
            Ok(None) => return Some(StaleReason::MissingTimestamp),
            Err(e) => return Some(StaleReason::UnreadableTimestamp(e.to_string())),
        };

        let age = state.age_at(now);
        if age > freshness_window {
            return Some(StaleReason::Expired { age });
        }

        self.catalogue
            .handles()
            .iter()
            .find(|h| !h.cache_path().is_file())
            .map(|h| StaleReason::MissingFile(h.resource()))
    }

    /// Rebuild the cache unless it is fresh now.
    pub fn ensure_fresh(&self, freshness_window: Duration) -> Result<CacheOutcome, GenreNetError> {
        self.ensure_fresh_at(freshness_window, Utc::now())
    }

    /// Rebuild the cache unless it is fresh at `now`.
    pub fn ensure_fresh_at(
        &self,
        freshness_window: Duration,
        now: DateTime<Utc>,
    ) -> Result<CacheOutcome, GenreNetError> {
        match self.assess_at(freshness_window, now) {
            None => {
                let state = self.read_state()?.ok_or_else(|| {
                    GenreNetError::Timestamp("timestamp vanished during check".to_string())
                })?;
                Ok(CacheOutcome::Fresh(state))
            }
            Some(reason) => {
                let state = self.rebuild_at(now)?;
                Ok(CacheOutcome::Rebuilt { reason, state })
            }
        }
    }

    /// Fetch every resource and rewrite the timestamp, following the
    /// rebuild protocol of this module.
    pub fn rebuild_at(&self, now: DateTime<Utc>) -> Result<CacheState, GenreNetError> {
        let cache_dir = self.catalogue.cache_dir();
        fs::create_dir_all(cache_dir).map_err(|e| {
            GenreNetError::Io(format!("Create cache dir {}: {}", cache_dir.display(), e))
        })?;

        let staging = self.staging_dir();
        remove_dir_if_present(&staging)?;
        fs::create_dir_all(&staging).map_err(|e| {
            GenreNetError::Io(format!("Create staging dir {}: {}", staging.display(), e))
        })?;

        let mut staged = Vec::with_capacity(self.catalogue.handles().len());
        for handle in self.catalogue.handles() {
            let target = staging.join(handle.resource().cache_file());
            if let Err(e) = self.fetcher.fetch_to(handle, &target) {
                let _ = fs::remove_dir_all(&staging);
                return Err(e);
            }
            staged.push((target, handle.cache_path()));
        }

        for (from, to) in &staged {
            fs::rename(from, to).map_err(|e| {
                GenreNetError::Io(format!("Move {} into {}: {}", from.display(), to.display(), e))
            })?;
        }

        let state = CacheState { refreshed_at: now };
        self.write_state(&state)?;
        remove_dir_if_present(&staging)?;

        Ok(state)
    }

    fn write_state(&self, state: &CacheState) -> Result<(), GenreNetError> {
        let path = self.timestamp_path();
        let partial = self.catalogue.cache_dir().join(format!("{}.tmp", TIMESTAMP_FILE));
        fs::write(&partial, state.render())
            .and_then(|()| fs::rename(&partial, &path))
            .map_err(|e| GenreNetError::Timestamp(format!("cannot write {}: {}", path.display(), e)))
    }

    /// Remove every cached resource file, then repopulate the cache.
    ///
    /// The timestamp is left in place; the missing files alone make the
    /// following `ensure_fresh` rebuild.
    pub fn force_delete(&self, freshness_window: Duration) -> Result<CacheOutcome, GenreNetError> {
        self.force_delete_at(freshness_window, Utc::now())
    }

    /// `force_delete` evaluated at `now`.
    pub fn force_delete_at(
        &self,
        freshness_window: Duration,
        now: DateTime<Utc>,
    ) -> Result<CacheOutcome, GenreNetError> {
        for resource in Resource::ALL {
            let path = self.catalogue.cache_dir().join(resource.cache_file());
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(GenreNetError::Io(format!(
                        "Delete {}: {}",
                        path.display(),
                        e
                    )));
                }
            }
        }
        self.ensure_fresh_at(freshness_window, now)
    }

    /// Report the cache as of now.
    pub fn status(&self, freshness_window: Duration) -> CacheStatus {
        self.status_at(freshness_window, Utc::now())
    }

    /// Report timestamp, staleness and file presence at `now`.
    pub fn status_at(&self, freshness_window: Duration, now: DateTime<Utc>) -> CacheStatus {
        let state = self.read_state().ok().flatten();
        CacheStatus {
            state,
            age: state.map(|s| s.age_at(now)),
            stale: self.assess_at(freshness_window, now),
            files: self
                .catalogue
                .handles()
                .iter()
                .map(|h| (h.resource(), h.cache_path().to_path_buf(), h.cache_path().is_file()))
                .collect(),
        }
    }
}

fn remove_dir_if_present(dir: &Path) -> Result<(), GenreNetError> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(GenreNetError::Io(format!("Remove {}: {}", dir.display(), e))),
    }
}

// =============================================================================
// TESTS
// =============================================================================
