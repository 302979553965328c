//! # Graph Rendering
//!
//! Serializes a [`GraphDescription`] for an external renderer.
//!
//! - `dot`: Graphviz source for a circular layout (`circo`). Nodes carry
//!   `genre:count` labels, edges carry their count as label and a pen
//!   width proportional to it.
//! - `json`: the node and edge lists as pretty-printed JSON.

use clap::ValueEnum;
use genrenet_core::{GenreNetError, GraphDescription};
use std::fmt::Write;

/// Thinnest and thickest edge pen width in the DOT output.
const MIN_PEN_WIDTH: f64 = 1.0;
const MAX_PEN_WIDTH: f64 = 8.0;

/// Output format of the `run` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Dot,
    Json,
}

/// Render `graph` in `format`.
pub fn render(graph: &GraphDescription, format: OutputFormat) -> Result<String, GenreNetError> {
    match format {
        OutputFormat::Dot => Ok(render_dot(graph)),
        OutputFormat::Json => render_json(graph),
    }
}

/// Graphviz source of `graph`.
#[must_use]
pub fn render_dot(graph: &GraphDescription) -> String {
    let mut out = String::new();
    let max_weight = graph.max_edge_weight();

    // writeln! into a String cannot fail
    let _ = writeln!(out, "graph genres {{");
    let _ = writeln!(out, "    layout=circo;");
    let _ = writeln!(out, "    node [shape=ellipse];");

    for node in graph.nodes() {
        let _ = writeln!(
            out,
            "    \"{}\" [label=\"{}:{}\"];",
            escape(&node.genre),
            escape(&node.genre),
            node.weight
        );
    }

    for edge in graph.edges() {
        let _ = writeln!(
            out,
            "    \"{}\" -- \"{}\" [label=\"{}\", penwidth={:.2}];",
            escape(&edge.source),
            escape(&edge.target),
            edge.weight,
            pen_width(edge.weight, max_weight)
        );
    }

    out.push_str("}\n");
    out
}

/// Pretty-printed JSON of `graph`.
pub fn render_json(graph: &GraphDescription) -> Result<String, GenreNetError> {
    serde_json::to_string_pretty(graph)
        .map_err(|e| GenreNetError::Io(format!("Serialize graph: {}", e)))
}

fn pen_width(weight: u64, max_weight: u64) -> f64 {
    if max_weight == 0 {
        return MIN_PEN_WIDTH;
    }
    MIN_PEN_WIDTH + (MAX_PEN_WIDTH - MIN_PEN_WIDTH) * (weight as f64 / max_weight as f64)
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

// =============================================================================
// TESTS
// =============================================================================
