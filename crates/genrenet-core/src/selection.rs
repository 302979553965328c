//! # Selection & Graph Builder
//!
//! Turns the two count mappings into a node/edge description for rendering.
//!
//! - Every genre of the universe is a node weighted by its frequency.
//! - Candidate edges are pairs with a count above zero inside
//!   `[minimal_count, maximal_count]`.
//! - With `top == 0` and `last == 0` every candidate is an edge.
//! - Otherwise candidates are ranked (descending count, then lexical pair
//!   order) and the union of the first `top` and the last `last` ranks
//!   becomes the edge set.
//!
//! [`build_graph`] is a pure function of its three inputs.

use crate::{CoOccurrenceCount, GenreCount, GenrePair};
use serde::Serialize;
use std::collections::BTreeSet;

// =============================================================================
// SELECTION PARAMETERS
// =============================================================================

/// Which co-occurrence pairs become graph edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionParams {
    /// Inclusive lower bound on an edge's count.
    pub minimal_count: u64,
    /// Inclusive upper bound on an edge's count.
    pub maximal_count: u64,
    /// Keep the N highest-ranked pairs. 0 disables.
    pub top: usize,
    /// Keep the N lowest-ranked pairs. 0 disables.
    pub last: usize,
}

impl Default for SelectionParams {
    fn default() -> Self {
        crate::Config::default().selection_params()
    }
}

impl SelectionParams {
    /// True if neither top nor last selection is active.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.top == 0 && self.last == 0
    }

    /// True if `count` may become an edge weight.
    #[must_use]
    pub fn admits(&self, count: u64) -> bool {
        count > 0 && count >= self.minimal_count && count <= self.maximal_count
    }
}

// =============================================================================
// GRAPH DESCRIPTION
// =============================================================================

/// A genre node with its display weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub genre: String,
    pub weight: u64,
}

/// A selected genre pair with its co-occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub weight: u64,
}

/// Nodes and weighted edges handed to the renderer.
///
/// Nodes follow first-seen genre order. Edges follow canonical pair order in
/// unrestricted mode and rank order otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphDescription {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

impl GraphDescription {
    #[must_use]
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    #[must_use]
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// True if the graph has neither nodes nor edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Largest edge weight, zero without edges.
    #[must_use]
    pub fn max_edge_weight(&self) -> u64 {
        self.edges.iter().map(|e| e.weight).max().unwrap_or(0)
    }
}

// =============================================================================
// RANKING
// =============================================================================

/// Admitted pairs ranked by descending count, ties in lexical pair order.
pub fn rank_pairs<'a>(
    co_occurrence: &'a CoOccurrenceCount,
    selection: &SelectionParams,
) -> Vec<(&'a GenrePair, u64)> {
    let mut ranked: Vec<_> = co_occurrence
        .iter()
        .filter(|(_, count)| selection.admits(*count))
        .collect();
    ranked.sort_by(|(pa, ca), (pb, cb)| cb.cmp(ca).then_with(|| pa.cmp(pb)));
    ranked
}

// =============================================================================
// BUILDER
// =============================================================================

/// Build the graph description of one run.
pub fn build_graph(
    genre_count: &GenreCount,
    co_occurrence: &CoOccurrenceCount,
    selection: &SelectionParams,
) -> GraphDescription {
    let nodes = genre_count
        .iter()
        .map(|(genre, weight)| GraphNode {
            genre: genre.to_string(),
            weight,
        })
        .collect();

    let chosen: Vec<(&GenrePair, u64)> = if selection.is_unrestricted() {
        co_occurrence
            .iter()
            .filter(|(_, count)| selection.admits(*count))
            .collect()
    } else {
        let ranked = rank_pairs(co_occurrence, selection);
        let len = ranked.len();

        let mut keep: BTreeSet<usize> = (0..selection.top.min(len)).collect();
        keep.extend(len.saturating_sub(selection.last)..len);

        keep.into_iter().map(|i| ranked[i]).collect()
    };

    let edges = chosen
        .into_iter()
        .map(|(pair, weight)| GraphEdge {
            source: pair.first().to_string(),
            target: pair.second().to_string(),
            weight,
        })
        .collect();

    GraphDescription { nodes, edges }
}

// =============================================================================
// TESTS
// =============================================================================
