use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("I/O error reading {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid CSV header: missing column {0:?}")]
    MissingColumn(String),

    #[error("invalid value at row {row}, column {column:?}: {value:?}")]
    CellParse {
        row: usize,
        column: String,
        value: String,
    },

    #[error(transparent)]
    Engine(#[from] viz_engine::EngineError),

    #[error("configuration error: {0}")]
    Config(String),
}
