use thiserror::Error;

/// Fatal problems in the count stream read by the reducer.
///
/// The cleaner and count emitter never produce these: they drop bad lines.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("line {line}: expected 3 tab-separated fields, got {found}: {text:?}")]
    FieldCount {
        line: usize,
        found: usize,
        text: String,
    },

    #[error("line {line}: count {count:?} is not an integer")]
    Count { line: usize, count: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Problems loading, joining or writing tables.
#[derive(Debug, Error)]
pub enum JoinError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("table {table} has no column {column:?}")]
    MissingColumn { table: String, column: String },

    #[error("table {table} row {row}: expected at most {expected} fields, got {found}")]
    RowWidth {
        table: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("join key arity differs: {left} left keys vs {right} right keys")]
    KeyArity { left: usize, right: usize },
}
