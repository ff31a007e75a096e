pub mod catalog;
pub mod config;
pub mod encoding;
pub mod error;
pub mod matcher;
pub mod ranker;
pub mod search;
pub mod similarity;
pub mod source;
pub mod stats;

pub use catalog::{ColumnData, EncodingContext, TableData};
pub use encoding::{encode_column, Encoding, TypeCategory};
pub use error::{Result, UnionError};
pub use ranker::{rank_candidates, top_k, MatchScore, TableRank};
pub use search::UnionSearch;
