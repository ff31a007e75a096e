use crate::catalog::TableData;
use crate::error::{UnionError, Result};
use crate::source::TableSource;
use async_trait::async_trait;

/// Tables held in memory, listed in insertion order
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: Vec<TableData>,
}

impl MemorySource {
    pub fn new(tables: Vec<TableData>) -> Self {
        Self { tables }
    }

    /// Add a table, replacing any table with the same name in place
    pub fn insert(&mut self, table: TableData) {
        match self.tables.iter_mut().find(|t| t.name == table.name) {
            Some(existing) => *existing = table,
            None => self.tables.push(table),
        }
    }
}

#[async_trait]
impl TableSource for MemorySource {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        Ok(self.tables.iter().map(|t| t.name.clone()).collect())
    }

    async fn load_table(&self, name: &str) -> Result<TableData> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .cloned()
            .ok_or_else(|| UnionError::TableNotFound(name.to_string()))
    }
}
