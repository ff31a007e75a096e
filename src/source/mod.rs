//! Table Sources
//!
//! A `TableSource` enumerates tables and delivers each table's columns with
//! declared types and raw textual values. The ranking engine itself never
//! touches storage.

pub mod csv_dir;
pub mod memory;
pub mod postgres;

pub use csv_dir::CsvDirSource;
pub use memory::MemorySource;
pub use postgres::PostgresSource;

use crate::catalog::TableData;
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait TableSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Table names in enumeration order
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Columns and values of one table
    async fn load_table(&self, name: &str) -> Result<TableData>;

    /// Load every table in enumeration order
    async fn load_all(&self) -> Result<Vec<TableData>> {
        let names = self.list_tables().await?;
        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            tables.push(self.load_table(&name).await?);
        }
        Ok(tables)
    }
}
