//! # genrenet-core
//!
//! The deterministic genre co-occurrence pipeline - THE LOGIC.
//!
//! This crate turns two bulk tab-separated datasets (titles and ratings)
//! into a weighted genre graph:
//!
//! - `cache` decides whether the local copy is fresh and rebuilds it
//! - `fetcher` downloads and decompresses one resource through a `Transport`
//! - `dataset` reads the cached files into the working table
//! - `filter` reduces the table to the configured subset
//! - `aggregate` counts genres and genre pairs
//! - `selection` picks the edges handed to a renderer
//!
//! ## Architectural Constraints
//!
//! - Has NO async and NO network client: the app layer supplies the
//!   `Transport` implementation
//! - Does not log: every stage returns a structured result (`CacheOutcome`,
//!   `FilterReport`) that the caller reports
//! - Count mappings are `BTreeMap`-backed; the same input always yields the
//!   same graph

// =============================================================================
// MODULES
// =============================================================================

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod dataset;
pub mod fetcher;
pub mod filter;
pub mod pipeline;
pub mod primitives;
pub mod selection;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{CoOccurrenceCount, GenreCount, GenreNetError, GenrePair, TitleRecord};

// =============================================================================
// RE-EXPORTS: Pipeline Stages
// =============================================================================

pub use aggregate::{count_combinations, count_genres, within_record_pairs};
pub use cache::{CacheManager, CacheOutcome, CacheState, CacheStatus, StaleReason};
pub use config::{Config, DatasetSettings, Params};
pub use dataset::{Catalogue, DatasetHandle, Resource, load_working_table};
pub use fetcher::{DatasetFetcher, Transport};
pub use filter::{FilterCriteria, FilterReport, filter};
pub use pipeline::{PipelineRun, analyze, run};
pub use selection::{GraphDescription, GraphEdge, GraphNode, SelectionParams, build_graph};
