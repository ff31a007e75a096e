use thiserror::Error;

#[derive(Error, Debug)]
pub enum UnionError {
    #[error("Input error: {0}")]
    Input(String),

    #[error("Cannot normalize feature vector for column {table}.{column}: norm is zero or not finite")]
    DegenerateVector { table: String, column: String },

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, UnionError>;
