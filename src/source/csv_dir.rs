//! Directory of CSV files, one table per `<table>.csv`.
//!
//! Header cells are `name` or `name:declared_type`. Columns without an
//! explicit type are declared `numeric` when every non-empty cell parses as
//! a number, `unknown` when they have no non-empty cells, and `varchar`
//! otherwise. Empty cells are nulls.

use crate::catalog::{ColumnData, TableData};
use crate::error::{UnionError, Result};
use crate::source::TableSource;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

const EXTENSION: &str = "csv";

pub struct CsvDirSource {
    data_dir: PathBuf,
}

impl CsvDirSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn table_path(&self, name: &str) -> Option<PathBuf> {
        if !is_table_name(name) {
            return None;
        }
        let path = self.data_dir.join(format!("{}.{}", name, EXTENSION));
        path.is_file().then_some(path)
    }
}

#[async_trait]
impl TableSource for CsvDirSource {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) if is_table_name(stem) => names.push(stem.to_string()),
                _ => debug!("Skipping {}", path.display()),
            }
        }
        names.sort();
        Ok(names)
    }

    async fn load_table(&self, name: &str) -> Result<TableData> {
        let path = self
            .table_path(name)
            .ok_or_else(|| UnionError::TableNotFound(name.to_string()))?;
        debug!("Reading table {} from {}", name, path.display());

        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(&path)?;
        let headers: Vec<(String, Option<String>)> = reader
            .headers()?
            .iter()
            .map(parse_header)
            .collect();

        let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
        for record in reader.records() {
            let record = record?;
            for (i, cell) in record.iter().enumerate() {
                values[i].push((!cell.is_empty()).then(|| cell.to_string()));
            }
        }

        let columns = headers
            .into_iter()
            .zip(values)
            .map(|((column, declared), values)| {
                let declared_type = declared.unwrap_or_else(|| infer_type(&values).to_string());
                ColumnData::new(column, declared_type, values)
            })
            .collect();

        Ok(TableData::new(name, columns))
    }
}

/// Hidden files and anything that could escape the directory are not tables.
/// Listing and loading both go through this, so every listed table loads.
fn is_table_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('.') && !name.contains(['/', '\\'])
}

fn parse_header(cell: &str) -> (String, Option<String>) {
    match cell.split_once(':') {
        Some((name, ty)) if !ty.trim().is_empty() => {
            (name.trim().to_string(), Some(ty.trim().to_string()))
        }
        Some((name, _)) => (name.trim().to_string(), None),
        None => (cell.trim().to_string(), None),
    }
}

fn infer_type(values: &[Option<String>]) -> &'static str {
    let mut present = values.iter().flatten().peekable();
    if present.peek().is_none() {
        return "unknown";
    }
    if present.all(|v| v.trim().parse::<f64>().is_ok()) {
        "numeric"
    } else {
        "varchar"
    }
}
