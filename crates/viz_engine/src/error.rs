use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("malformed hours interval {value:?}, expected \"HH:MM-HH:MM\" or \"Closed\"")]
    MalformedInterval { value: String },

    #[error("failed to compute column {column:?} for row {row}: {source}")]
    ColumnComputation {
        column: String,
        row: u64,
        #[source]
        source: Box<EngineError>,
    },

    #[error("column {0:?} already exists")]
    DuplicateColumn(String),

    #[error("unknown column {0:?}")]
    UnknownColumn(String),

    #[error("duplicate row id {0}")]
    DuplicateRowId(u64),

    #[error("configuration error: {0}")]
    Config(String),
}
