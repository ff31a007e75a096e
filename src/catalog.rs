//! Table data and the per-request encoding context.
//!
//! Every column of every table is encoded exactly once. The query table's
//! encodings are kept apart from the candidates; candidate encodings sit in
//! one flat list, partitioned per table by a running prefix sum of column
//! counts so a table's columns can be sliced out directly.

use crate::encoding::{encode_column, Encoding};
use crate::error::{UnionError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// One column as delivered by a table source. `None` values are nulls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnData {
    pub name: String,
    pub declared_type: String,
    pub values: Vec<Option<String>>,
}

impl ColumnData {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            values,
        }
    }

    /// Build a column with no nulls
    pub fn from_strs(name: &str, declared_type: &str, values: &[&str]) -> Self {
        Self::new(
            name,
            declared_type,
            values.iter().map(|v| Some(v.to_string())).collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub name: String,
    pub columns: Vec<ColumnData>,
}

impl TableData {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnData>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Encode every column, in column order
    pub fn encode(&self) -> Result<Vec<Encoding>> {
        self.columns
            .iter()
            .map(|c| encode_column(&c.values, &c.declared_type, &c.name, &self.name))
            .collect()
    }
}

/// Encodings of the query table
#[derive(Debug, Clone, Default)]
pub struct QueryEncodings {
    table_name: String,
    encodings: Vec<Encoding>,
}

impl QueryEncodings {
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn encodings(&self) -> &[Encoding] {
        &self.encodings
    }
}

/// Candidate encodings grouped by owning table
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    encodings: Vec<Encoding>,
    table_names: Vec<String>,
    /// `boundaries[i]` is one past the last encoding of table `i`
    boundaries: Vec<usize>,
}

impl CandidateSet {
    /// Append a table's encodings as its own slot. Tables with no columns
    /// still get a slot.
    pub fn push_table(&mut self, table_name: impl Into<String>, encodings: Vec<Encoding>) {
        self.encodings.extend(encodings);
        self.table_names.push(table_name.into());
        self.boundaries.push(self.encodings.len());
    }

    pub fn len(&self) -> usize {
        self.table_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table_names.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.encodings.len()
    }

    /// Name and encodings of the `index`-th table
    pub fn table_slice(&self, index: usize) -> Option<(&str, &[Encoding])> {
        let end = *self.boundaries.get(index)?;
        let start = if index == 0 { 0 } else { self.boundaries[index - 1] };
        Some((&self.table_names[index], &self.encodings[start..end]))
    }

    /// All tables in insertion order
    pub fn tables(&self) -> impl Iterator<Item = (&str, &[Encoding])> + '_ {
        (0..self.len()).filter_map(move |i| self.table_slice(i))
    }
}

/// Owned encodings for one ranking request
#[derive(Debug, Clone, Default)]
pub struct EncodingContext {
    pub query: QueryEncodings,
    pub candidates: CandidateSet,
}

impl EncodingContext {
    /// Encode `tables`, splitting off `query_table`.
    ///
    /// Any encoding failure aborts the whole build; there are no partial
    /// contexts.
    pub fn build(query_table: &str, tables: &[TableData]) -> Result<Self> {
        let mut query = None;
        let mut candidates = CandidateSet::default();

        for table in tables {
            let encodings = table.encode()?;
            debug!("Encoded {} columns of table {}", encodings.len(), table.name);
            if table.name == query_table {
                query = Some(QueryEncodings {
                    table_name: table.name.clone(),
                    encodings,
                });
            } else {
                candidates.push_table(table.name.clone(), encodings);
            }
        }

        let query = query.ok_or_else(|| UnionError::TableNotFound(query_table.to_string()))?;
        if candidates.is_empty() {
            warn!("No candidate tables besides {}", query.table_name);
        }
        info!(
            "Encoded query table {} ({} columns) against {} candidate tables ({} columns)",
            query.table_name,
            query.encodings.len(),
            candidates.len(),
            candidates.column_count()
        );

        Ok(Self { query, candidates })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> TableData {
        TableData::new(
            "people",
            vec![
                ColumnData::from_strs("id", "int4", &["1", "2", "3"]),
                ColumnData::from_strs("name", "varchar", &["ann", "bob", "cy"]),
            ],
        )
    }

    #[test]
    fn test_candidate_slices_follow_boundaries() {
        let tables = vec![
            people(),
            TableData::new("a", vec![ColumnData::from_strs("x", "int4", &["4", "5"])]),
            TableData::new("empty", vec![]),
            TableData::new(
                "b",
                vec![
                    ColumnData::from_strs("y", "int4", &["7"]),
                    ColumnData::from_strs("z", "text", &["hello"]),
                ],
            ),
        ];
        let ctx = EncodingContext::build("people", &tables).unwrap();

        assert_eq!(ctx.query.table_name(), "people");
        assert_eq!(ctx.query.encodings().len(), 2);
        assert_eq!(ctx.candidates.len(), 3);
        assert_eq!(ctx.candidates.column_count(), 3);

        let (name, slice) = ctx.candidates.table_slice(0).unwrap();
        assert_eq!(name, "a");
        assert_eq!(slice.len(), 1);

        let (name, slice) = ctx.candidates.table_slice(1).unwrap();
        assert_eq!(name, "empty");
        assert!(slice.is_empty());

        let (name, slice) = ctx.candidates.table_slice(2).unwrap();
        assert_eq!(name, "b");
        let cols: Vec<_> = slice.iter().map(|e| e.column_name.as_str()).collect();
        assert_eq!(cols, vec!["y", "z"]);

        assert!(ctx.candidates.table_slice(3).is_none());
        assert_eq!(ctx.candidates.tables().count(), 3);
    }

    #[test]
    fn test_query_table_alone_has_no_candidates() {
        let ctx = EncodingContext::build("people", &[people()]).unwrap();
        assert!(ctx.candidates.is_empty());
        assert_eq!(ctx.candidates.tables().count(), 0);
    }

    #[test]
    fn test_missing_query_table() {
        let err = EncodingContext::build("nope", &[people()]).unwrap_err();
        assert!(matches!(err, UnionError::TableNotFound(name) if name == "nope"));
    }

    #[test]
    fn test_encoding_failure_aborts_build() {
        let tables = vec![
            people(),
            TableData::new("no_rows", vec![ColumnData::new("n", "numeric", vec![])]),
        ];
        let err = EncodingContext::build("people", &tables).unwrap_err();
        assert!(matches!(err, UnionError::Input(_)));
    }

    #[test]
    fn test_overflowing_candidate_aborts_build() {
        let tables = vec![
            people(),
            TableData::new("huge", vec![ColumnData::from_strs("h", "float8", &["1e200", "1"])]),
        ];
        let err = EncodingContext::build("people", &tables).unwrap_err();
        assert!(matches!(err, UnionError::DegenerateVector { ref table, .. } if table == "huge"));
    }
}
