//! Unit tests for CLI parsing and graph rendering.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use clap::Parser;
use genrenet::cli::{Cli, Commands};
use genrenet::render::{OutputFormat, render, render_dot, render_json};
use genrenet_core::{
    SelectionParams, TitleRecord, build_graph, count_combinations, count_genres,
};
use std::path::PathBuf;

fn graph(specs: &[&str], selection: &SelectionParams) -> genrenet_core::GraphDescription {
    let rows: Vec<TitleRecord> = specs
        .iter()
        .map(|s| {
            let labels = s.split(',').map(str::to_string).collect();
            TitleRecord::new("tt", Some(2000), Some(7.0), Some(labels))
        })
        .collect();
    let genres = count_genres(&rows);
    let pairs = count_combinations(&rows, &genres);
    build_graph(&genres, &pairs, selection)
}

// =============================================================================
// CLI PARSING TESTS
// =============================================================================

#[test]
fn test_no_subcommand_defaults_to_run() {
    let cli = Cli::try_parse_from(["genrenet"]).unwrap();
    assert!(cli.command.is_none());
    assert!(!cli.json_mode);
    assert_eq!(cli.timeout, 600);
}

#[test]
fn test_run_with_param_overrides() {
    let cli = Cli::try_parse_from([
        "genrenet",
        "run",
        "--minimal-rating",
        "6.5",
        "--top",
        "10",
        "--seed",
        "3",
        "-o",
        "out.dot",
        "-t",
        "json",
    ])
    .unwrap();

    match cli.command {
        Some(Commands::Run {
            params,
            output,
            format,
        }) => {
            assert_eq!(params.minimal_rating, Some(6.5));
            assert_eq!(params.top, Some(10));
            assert_eq!(params.seed, Some(3));
            assert_eq!(params.last, None);
            assert_eq!(output, Some(PathBuf::from("out.dot")));
            assert_eq!(format, OutputFormat::Json);
        }
        other => panic!("expected run, got {:?}", other),
    }
}

#[test]
fn test_global_dataset_flags() {
    let cli = Cli::try_parse_from([
        "genrenet",
        "status",
        "--cache-dir",
        "/tmp/genres",
        "--include-crew",
        "--freshness-days",
        "2",
    ])
    .unwrap();

    assert!(matches!(cli.command, Some(Commands::Status)));
    let overrides = cli.dataset_overrides();
    assert_eq!(overrides.cache_dir, Some(PathBuf::from("/tmp/genres")));
    assert_eq!(overrides.freshness_days, Some(2));
    assert!(overrides.include_crew);
}

#[test]
fn test_unknown_format_rejected() {
    assert!(Cli::try_parse_from(["genrenet", "run", "--format", "svg"]).is_err());
}

// =============================================================================
// RENDER TESTS
// =============================================================================

#[test]
fn test_dot_labels_and_widths() {
    let graph = graph(&["Action,Comedy", "Action,Comedy", "Comedy,Drama"], &SelectionParams::default());
    let dot = render_dot(&graph);

    assert!(dot.contains("layout=circo;"));
    assert!(dot.contains("\"Action\" [label=\"Action:2\"];"));
    assert!(dot.contains("\"Comedy\" [label=\"Comedy:3\"];"));
    assert!(dot.contains("\"Action\" -- \"Comedy\" [label=\"2\", penwidth=8.00];"));
    assert!(dot.contains("\"Comedy\" -- \"Drama\" [label=\"1\", penwidth=4.50];"));
    assert!(!dot.contains("\"Action\" -- \"Drama\""));
}

#[test]
fn test_json_lists_nodes_and_edges() {
    let graph = graph(&["Action,Comedy", "Comedy,Drama"], &SelectionParams::default());
    let json: serde_json::Value = serde_json::from_str(&render_json(&graph).unwrap()).unwrap();

    assert_eq!(json["nodes"].as_array().unwrap().len(), 3);
    assert_eq!(json["edges"].as_array().unwrap().len(), 2);
    assert_eq!(json["nodes"][0]["genre"], "Action");
    assert_eq!(json["edges"][0]["weight"], 1);
}

#[test]
fn test_render_dispatches_on_format() {
    let graph = graph(&["Action,Comedy"], &SelectionParams::default());
    assert!(render(&graph, OutputFormat::Dot).unwrap().starts_with("graph"));
    assert!(render(&graph, OutputFormat::Json).unwrap().starts_with('{'));
}
