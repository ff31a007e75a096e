//! Unionable Table Search
//!
//! Entry points over a `TableSource`: load every table, encode each column
//! once, score every candidate table against the query table with a greedy
//! column matching, and rank. Each request builds its own `EncodingContext`;
//! nothing is kept between requests.

use crate::catalog::EncodingContext;
use crate::encoding::Encoding;
use crate::error::Result;
use crate::matcher::TableMatch;
use crate::ranker::{match_candidates, rank_candidates, top_k, TableRank};
use crate::source::TableSource;
use tracing::info;

pub struct UnionSearch {
    source: Box<dyn TableSource>,
}

impl UnionSearch {
    pub fn new(source: impl TableSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    pub fn from_boxed(source: Box<dyn TableSource>) -> Self {
        Self { source }
    }

    /// Names of the top `k` tables most unionable with `query_table`.
    ///
    /// `k == 0` returns an empty list without reading any table. At most
    /// `ranked - 1` names are returned.
    pub async fn find_top_k(&self, query_table: &str, k: usize) -> Result<Vec<String>> {
        if k == 0 {
            info!("k is 0, nothing to return");
            return Ok(Vec::new());
        }

        let ranked = self.rank(query_table).await?;
        Ok(top_k(&ranked, k))
    }

    /// Every candidate table ordered by descending match score
    pub async fn rank(&self, query_table: &str) -> Result<Vec<TableRank>> {
        let context = self.build_context(query_table).await?;
        let ranked = rank_candidates(&context);

        info!("Ranked {} tables for {}", ranked.len(), query_table);
        for rank in &ranked {
            info!("( {}, {} )", rank.table_name, rank.match_score);
        }
        Ok(ranked)
    }

    /// Accepted column pairs per candidate table, in ranked order
    pub async fn explain(&self, query_table: &str) -> Result<Vec<TableMatch>> {
        let context = self.build_context(query_table).await?;
        Ok(match_candidates(&context))
    }

    /// Encodings of a single table
    pub async fn encode_table(&self, table: &str) -> Result<Vec<Encoding>> {
        self.source.load_table(table).await?.encode()
    }

    async fn build_context(&self, query_table: &str) -> Result<EncodingContext> {
        let tables = self.source.load_all().await?;
        info!(
            "Loaded {} tables from {} source",
            tables.len(),
            self.source.name()
        );
        EncodingContext::build(query_table, &tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TableData;
    use crate::error::UnionError;
    use crate::source::TableSource;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Source that counts reads and has no tables
    struct CountingSource {
        reads: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TableSource for CountingSource {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn list_tables(&self) -> Result<Vec<String>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        async fn load_table(&self, name: &str) -> Result<TableData> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Err(UnionError::TableNotFound(name.to_string()))
        }
    }

    #[tokio::test]
    async fn test_zero_k_skips_source() {
        let reads = Arc::new(AtomicUsize::new(0));
        let search = UnionSearch::new(CountingSource { reads: reads.clone() });

        let result = search.find_top_k("anything", 0).await.unwrap();
        assert!(result.is_empty());
        assert_eq!(reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_query_table_is_error() {
        let reads = Arc::new(AtomicUsize::new(0));
        let search = UnionSearch::new(CountingSource { reads: reads.clone() });

        let err = search.find_top_k("anything", 3).await.unwrap_err();
        assert!(matches!(err, UnionError::TableNotFound(_)));
        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }
}
