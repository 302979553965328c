//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::render::{OutputFormat, render};
use crate::transport::HttpTransport;
use genrenet_core::dataset::count_rows;
use genrenet_core::{
    CacheManager, CacheOutcome, CacheStatus, Catalogue, Config, FilterReport, GenreNetError,
    PipelineRun, selection::rank_pairs,
};
use std::path::Path;
use std::time::Duration;

/// Flags shared by every command.
#[derive(Debug, Clone, Copy)]
pub struct CommandContext {
    pub json_mode: bool,
    pub timeout: Duration,
}

fn cache_manager(
    context: &CommandContext,
    config: &Config,
) -> Result<CacheManager<HttpTransport>, GenreNetError> {
    let transport = HttpTransport::new(context.timeout)?;
    Ok(CacheManager::new(
        Catalogue::from_settings(&config.dataset),
        transport,
    ))
}

/// Log what the cache gate did.
pub fn report_cache(outcome: &CacheOutcome) {
    match outcome {
        CacheOutcome::Fresh(state) => {
            tracing::info!(refreshed_at = %state.render(), "Dataset is up to date");
        }
        CacheOutcome::Rebuilt { reason, state } => {
            tracing::info!(%reason, refreshed_at = %state.render(), "Dataset rebuilt");
        }
    }
}

/// Log the filter pass.
pub fn report_filter(report: &FilterReport) {
    tracing::info!(
        total = report.total,
        retained = report.retained,
        unknown = report.dropped_unknown,
        year = report.dropped_year,
        rating = report.dropped_rating,
        sampling = report.dropped_sampling,
        "Filtered working table"
    );
    if report.is_empty() {
        tracing::warn!("No titles left after filtering; the graph is empty");
    }
}

/// Gate the cache, then run the analysis on it.
fn fresh_analysis(
    context: &CommandContext,
    config: &Config,
) -> Result<PipelineRun, GenreNetError> {
    let transport = HttpTransport::new(context.timeout)?;
    let (outcome, run) = genrenet_core::run(config, transport)?;
    report_cache(&outcome);
    report_filter(&run.filter_report);
    tracing::debug!(
        genres = run.genre_count.len(),
        pairs = run.co_occurrence.len(),
        "Counted co-occurrences"
    );
    Ok(run)
}

// =============================================================================
// RUN COMMAND
// =============================================================================

/// Render the graph of one run.
pub fn cmd_run(
    context: &CommandContext,
    config: &Config,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<(), GenreNetError> {
    let run = fresh_analysis(context, config)?;
    let rendered = render(&run.graph, format)?;

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .map_err(|e| GenreNetError::Io(format!("Write {}: {}", path.display(), e)))?;
            tracing::info!(
                path = %path.display(),
                nodes = run.graph.node_count(),
                edges = run.graph.edge_count(),
                "Graph written"
            );
            if context.json_mode {
                let summary = serde_json::json!({
                    "output": path.to_string_lossy(),
                    "titles": run.filter_report.retained,
                    "nodes": run.graph.node_count(),
                    "edges": run.graph.edge_count(),
                });
                println!("{}", serde_json::to_string_pretty(&summary).unwrap_or_default());
            }
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

// =============================================================================
// REFRESH COMMAND
// =============================================================================

/// Delete the cached resources and fetch them again.
pub fn cmd_refresh(context: &CommandContext, config: &Config) -> Result<(), GenreNetError> {
    let cache = cache_manager(context, config)?;
    let outcome = cache.force_delete(config.freshness_window())?;
    report_cache(&outcome);

    if context.json_mode {
        let output = serde_json::json!({
            "rebuilt": outcome.was_rebuilt(),
            "refreshed_at": outcome.state().render(),
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
        return Ok(());
    }

    println!("Dataset refreshed at {}", outcome.state().render());
    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show cache status.
pub fn cmd_status(context: &CommandContext, config: &Config) -> Result<(), GenreNetError> {
    let cache = cache_manager(context, config)?;
    let status = cache.status(config.freshness_window());
    let refreshed_at = status.state.map(|s| s.render());
    let stale = status.stale.as_ref().map(ToString::to_string);
    let age_hours = status.age.map(|age| age.num_hours());
    let rows = row_counts(&cache, &status);

    if context.json_mode {
        let files: Vec<_> = status
            .files
            .iter()
            .zip(&rows)
            .map(|((resource, path, present), rows)| {
                serde_json::json!({
                    "resource": resource.name(),
                    "path": path.to_string_lossy(),
                    "present": present,
                    "rows": rows,
                })
            })
            .collect();
        let output = serde_json::json!({
            "cache_dir": config.dataset.cache_dir.to_string_lossy(),
            "refreshed_at": refreshed_at,
            "age_hours": age_hours,
            "freshness_days": config.dataset.freshness_days,
            "stale": stale,
            "files": files,
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
        return Ok(());
    }

    println!("genrenet Cache Status");
    println!("=====================");
    println!("Cache dir:  {:?}", config.dataset.cache_dir);
    println!(
        "Refreshed:  {}",
        refreshed_at.as_deref().unwrap_or("never")
    );
    if let Some(hours) = age_hours {
        println!("Age:        {}d {}h", hours / 24, hours % 24);
    }
    println!("Window:     {} days", config.dataset.freshness_days);
    println!(
        "State:      {}",
        stale.as_deref().map_or("fresh".to_string(), |r| format!("stale ({})", r))
    );
    println!();
    for ((resource, path, present), rows) in status.files.iter().zip(&rows) {
        println!(
            "  {:<8} {:<8} {:>10} {:?}",
            resource.name(),
            if *present { "present" } else { "missing" },
            rows.map_or("-".to_string(), |n| format!("{} rows", n)),
            path
        );
    }

    Ok(())
}

/// Data rows of every present cached file, `None` when missing or unreadable.
fn row_counts(cache: &CacheManager<HttpTransport>, status: &CacheStatus) -> Vec<Option<usize>> {
    status
        .files
        .iter()
        .map(|(resource, _, present)| {
            let handle = cache.catalogue().get(*resource).filter(|_| *present)?;
            match count_rows(handle) {
                Ok(rows) => Some(rows),
                Err(e) => {
                    tracing::warn!(resource = %resource, error = %e, "Cannot count rows");
                    None
                }
            }
        })
        .collect()
}

// =============================================================================
// COUNTS COMMAND
// =============================================================================

/// Print genre frequencies and the most frequent pairs.
pub fn cmd_counts(
    context: &CommandContext,
    config: &Config,
    limit: usize,
) -> Result<(), GenreNetError> {
    let run = fresh_analysis(context, config)?;
    let ranked = rank_pairs(&run.co_occurrence, &config.selection_params());

    if context.json_mode {
        let genres: Vec<_> = run
            .genre_count
            .iter()
            .map(|(genre, count)| serde_json::json!({ "genre": genre, "count": count }))
            .collect();
        let pairs: Vec<_> = ranked
            .iter()
            .take(limit)
            .map(|(pair, count)| {
                serde_json::json!({
                    "first": pair.first(),
                    "second": pair.second(),
                    "count": count,
                })
            })
            .collect();
        let output = serde_json::json!({
            "titles": run.filter_report.retained,
            "genres": genres,
            "pairs": pairs,
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
        return Ok(());
    }

    println!("Titles: {}", run.filter_report.retained);
    println!();
    println!("Genres:");
    for (genre, count) in run.genre_count.iter() {
        println!("  {:<14} {}", genre, count);
    }
    println!();
    println!("Pairs (top {}):", limit.min(ranked.len()));
    for (pair, count) in ranked.iter().take(limit) {
        println!("  {:<28} {}", pair.to_string(), count);
    }

    Ok(())
}
