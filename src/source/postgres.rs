//! PostgreSQL table source using sqlx
//!
//! Tables are the `pg_tables` entries of one schema. Column types are the
//! `udt_name`s from `information_schema.columns` (`int4`, `varchar`,
//! `numeric`, ...), and every value is read back cast to text.

use crate::catalog::{ColumnData, TableData};
use crate::error::{UnionError, Result};
use crate::source::TableSource;
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use std::time::Duration;
use tracing::{debug, info};

const CREATE_ENCODINGS_TABLE: &str = "CREATE TABLE IF NOT EXISTS encodings \
     (tbl_name VARCHAR, column_name VARCHAR, vector DOUBLE PRECISION[])";

pub struct PostgresSource {
    pool: PgPool,
    schema: String,
}

impl PostgresSource {
    /// Connect a pool and verify it with a trivial query
    pub async fn connect(database_url: &str, schema: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(database_url)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;
        info!("Connected to PostgreSQL (schema {})", schema);

        Ok(Self::from_pool(pool, schema))
    }

    pub fn from_pool(pool: PgPool, schema: &str) -> Self {
        Self {
            pool,
            schema: schema.to_string(),
        }
    }

    /// Create the `encodings` table if it does not exist yet.
    ///
    /// Administrative setup only; ranking never reads or writes it.
    pub async fn ensure_encodings_table(&self) -> Result<()> {
        sqlx::query(CREATE_ENCODINGS_TABLE).execute(&self.pool).await?;
        info!("Ensured encodings table exists");
        Ok(())
    }

    async fn table_exists(&self, name: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM pg_tables WHERE schemaname = $1 AND tablename = $2)",
        )
        .bind(&self.schema)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

#[async_trait]
impl TableSource for PostgresSource {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT tablename::text FROM pg_tables WHERE schemaname = $1 ORDER BY tablename",
        )
        .bind(&self.schema)
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    async fn load_table(&self, name: &str) -> Result<TableData> {
        let columns: Vec<(String, String)> = sqlx::query_as(
            "SELECT column_name::text, udt_name::text FROM information_schema.columns \
             WHERE table_schema = $1 AND table_name = $2 ORDER BY ordinal_position",
        )
        .bind(&self.schema)
        .bind(name)
        .fetch_all(&self.pool)
        .await?;

        if columns.is_empty() {
            if self.table_exists(name).await? {
                return Ok(TableData::new(name, Vec::new()));
            }
            return Err(UnionError::TableNotFound(name.to_string()));
        }

        let sql = select_as_text(&self.schema, name, columns.iter().map(|(c, _)| c.as_str()));
        debug!("Fetching rows: {}", sql);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut values: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(rows.len()); columns.len()];
        for row in &rows {
            for (i, column_values) in values.iter_mut().enumerate() {
                column_values.push(row.try_get::<Option<String>, _>(i)?);
            }
        }

        let columns = columns
            .into_iter()
            .zip(values)
            .map(|((column, udt), values)| ColumnData::new(column, udt, values))
            .collect();

        Ok(TableData::new(name, columns))
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn select_as_text<'a>(schema: &str, table: &str, columns: impl Iterator<Item = &'a str>) -> String {
    let projection = columns
        .map(|c| format!("{}::text", quote_ident(c)))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "SELECT {} FROM {}.{}",
        projection,
        quote_ident(schema),
        quote_ident(table)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("orders"), "\"orders\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_select_as_text() {
        let sql = select_as_text("public", "Orders", ["id", "total amount"].into_iter());
        assert_eq!(
            sql,
            "SELECT \"id\"::text, \"total amount\"::text FROM \"public\".\"Orders\""
        );
    }
}
