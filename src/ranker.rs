//! Table ranking and top-K selection.

use crate::catalog::EncodingContext;
use crate::matcher::{match_table, TableMatch};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Table-level match score.
///
/// `Incomparable` marks a table that shared no type category with the query
/// and orders below every scored table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchScore {
    Scored(f64),
    Incomparable,
}

impl MatchScore {
    pub fn value(&self) -> Option<f64> {
        match self {
            MatchScore::Scored(v) => Some(*v),
            MatchScore::Incomparable => None,
        }
    }
}

impl From<Option<f64>> for MatchScore {
    fn from(score: Option<f64>) -> Self {
        score.map_or(MatchScore::Incomparable, MatchScore::Scored)
    }
}

impl Eq for MatchScore {}

impl Ord for MatchScore {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (MatchScore::Scored(a), MatchScore::Scored(b)) => a.total_cmp(b),
            (MatchScore::Scored(_), MatchScore::Incomparable) => Ordering::Greater,
            (MatchScore::Incomparable, MatchScore::Scored(_)) => Ordering::Less,
            (MatchScore::Incomparable, MatchScore::Incomparable) => Ordering::Equal,
        }
    }
}

impl PartialOrd for MatchScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for MatchScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

impl fmt::Display for MatchScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchScore::Scored(v) => write!(f, "{:.6}", v),
            MatchScore::Incomparable => write!(f, "-inf"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRank {
    pub table_name: String,
    pub match_score: MatchScore,
}

impl From<&TableMatch> for TableRank {
    fn from(m: &TableMatch) -> Self {
        Self {
            table_name: m.table_name.clone(),
            match_score: m.score.into(),
        }
    }
}

/// Run one greedy round per candidate table and return the rounds ordered
/// best first.
pub fn match_candidates(context: &EncodingContext) -> Vec<TableMatch> {
    let query = context.query.encodings();
    let mut matches: Vec<TableMatch> = context
        .candidates
        .tables()
        .map(|(table_name, slice)| match_table(table_name, query, slice))
        .collect();
    matches.sort_by(|a, b| MatchScore::from(b.score).cmp(&MatchScore::from(a.score)));
    matches
}

/// Score every candidate table and order them by descending match score.
/// Order among equal scores is not guaranteed.
pub fn rank_candidates(context: &EncodingContext) -> Vec<TableRank> {
    match_candidates(context).iter().map(TableRank::from).collect()
}

/// Names of the first `min(k, ranked.len() - 1)` ranked tables.
///
/// The final ranked slot is never returned, even when `k` would reach it.
pub fn top_k(ranked: &[TableRank], k: usize) -> Vec<String> {
    let limit = k.min(ranked.len().saturating_sub(1));
    ranked
        .iter()
        .take(limit)
        .map(|r| r.table_name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rank(name: &str, score: Option<f64>) -> TableRank {
        TableRank {
            table_name: name.to_string(),
            match_score: score.into(),
        }
    }

    #[test]
    fn test_incomparable_orders_last() {
        let mut scores = vec![
            MatchScore::Incomparable,
            MatchScore::Scored(-3.0),
            MatchScore::Scored(1.5),
        ];
        scores.sort_by(|a, b| b.cmp(a));
        assert_eq!(
            scores,
            vec![MatchScore::Scored(1.5), MatchScore::Scored(-3.0), MatchScore::Incomparable]
        );
    }

    #[test]
    fn test_top_k_drops_last_slot() {
        let ranked = vec![
            rank("a", Some(2.0)),
            rank("b", Some(1.0)),
            rank("c", None),
        ];
        assert_eq!(top_k(&ranked, 1), vec!["a"]);
        assert_eq!(top_k(&ranked, 2), vec!["a", "b"]);
        assert_eq!(top_k(&ranked, 10), vec!["a", "b"]);
        assert!(top_k(&ranked, 0).is_empty());
    }

    #[test]
    fn test_top_k_degenerate_lengths() {
        assert!(top_k(&[], 5).is_empty());
        assert!(top_k(&[rank("only", Some(1.0))], 5).is_empty());
    }

    #[test]
    fn test_score_serializes_as_nullable_number() {
        let json = serde_json::to_string(&rank("t", None)).unwrap();
        assert_eq!(json, r#"{"table_name":"t","match_score":null}"#);
        let json = serde_json::to_string(&rank("t", Some(0.5))).unwrap();
        assert_eq!(json, r#"{"table_name":"t","match_score":0.5}"#);
    }

    #[test]
    fn test_display() {
        assert_eq!(MatchScore::Incomparable.to_string(), "-inf");
        assert_eq!(MatchScore::Scored(1.0).to_string(), "1.000000");
    }
}
