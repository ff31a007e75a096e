//! Greedy Column Matching
//!
//! Scores one candidate table against the query table by pairing columns
//! one-to-one. All type-compatible (query, candidate) pairs become edges,
//! edges are consumed from highest to lowest similarity, and an edge is
//! accepted when neither endpoint has been matched yet. This is a greedy
//! heuristic, not an optimal assignment.
//!
//! Matching state lives in a `MatchRound` built per table and dropped when
//! the round ends, so nothing can leak from one table to the next.

use crate::encoding::Encoding;
use crate::similarity::similarity;
use serde::Serialize;
use tracing::debug;

/// Matching-state shadow of one column within a round
#[derive(Debug, Clone)]
pub struct ColumnNode<'a> {
    pub table_name: &'a str,
    pub column_name: &'a str,
    pub matched: bool,
}

impl<'a> ColumnNode<'a> {
    fn new(encoding: &'a Encoding) -> Self {
        Self {
            table_name: &encoding.table_name,
            column_name: &encoding.column_name,
            matched: false,
        }
    }
}

/// A feasible pairing inside one round. Endpoints are indices into the
/// round's query and candidate node lists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityEdge {
    pub query: usize,
    pub candidate: usize,
    pub score: f64,
}

/// An accepted edge, with owned names for reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedPair {
    pub query_column: String,
    pub candidate_column: String,
    pub score: f64,
}

/// Outcome of one table's round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableMatch {
    pub table_name: String,
    /// Sum of accepted scores; `None` when no type-compatible pair existed
    pub score: Option<f64>,
    /// Accepted pairs in acceptance order
    pub pairs: Vec<MatchedPair>,
}

struct MatchRound<'a> {
    query_nodes: Vec<ColumnNode<'a>>,
    candidate_nodes: Vec<ColumnNode<'a>>,
    edges: Vec<SimilarityEdge>,
}

impl<'a> MatchRound<'a> {
    fn new(query: &'a [Encoding], candidates: &'a [Encoding]) -> Self {
        let mut edges = Vec::new();
        for (qi, q) in query.iter().enumerate() {
            for (ci, c) in candidates.iter().enumerate() {
                if q.type_category == c.type_category {
                    edges.push(SimilarityEdge {
                        query: qi,
                        candidate: ci,
                        score: similarity(&q.vector, &c.vector),
                    });
                }
            }
        }
        // descending; tie order is unspecified
        edges.sort_by(|a, b| b.score.total_cmp(&a.score));

        Self {
            query_nodes: query.iter().map(ColumnNode::new).collect(),
            candidate_nodes: candidates.iter().map(ColumnNode::new).collect(),
            edges,
        }
    }

    fn run(mut self) -> Vec<SimilarityEdge> {
        let mut accepted = Vec::new();
        for edge in &self.edges {
            if self.query_nodes[edge.query].matched || self.candidate_nodes[edge.candidate].matched {
                continue;
            }
            self.query_nodes[edge.query].matched = true;
            self.candidate_nodes[edge.candidate].matched = true;
            debug!(
                "{}.{} matched with {}.{} (Similarity Score: {:.6})",
                self.query_nodes[edge.query].table_name,
                self.query_nodes[edge.query].column_name,
                self.candidate_nodes[edge.candidate].table_name,
                self.candidate_nodes[edge.candidate].column_name,
                edge.score
            );
            accepted.push(*edge);
        }
        accepted
    }
}

/// Run one greedy round for a candidate table.
///
/// `candidates` must be the encodings owned by `table_name` only.
pub fn match_table(table_name: &str, query: &[Encoding], candidates: &[Encoding]) -> TableMatch {
    let round = MatchRound::new(query, candidates);
    if round.edges.is_empty() {
        return TableMatch {
            table_name: table_name.to_string(),
            score: None,
            pairs: Vec::new(),
        };
    }

    let accepted = round.run();
    let score = accepted.iter().map(|e| e.score).sum();
    let pairs = accepted
        .iter()
        .map(|e| MatchedPair {
            query_column: query[e.query].column_name.clone(),
            candidate_column: candidates[e.candidate].column_name.clone(),
            score: e.score,
        })
        .collect();

    TableMatch {
        table_name: table_name.to_string(),
        score: Some(score),
        pairs,
    }
}
