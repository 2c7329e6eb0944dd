// Error taxonomy for the upload → aggregate → store → report pipeline.
// Startup/config code stays on anyhow; everything a request can hit returns this.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Upload bytes are not a readable CSV table (bad UTF-8, ragged rows, no header).
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// Zero data rows: averages would be undefined, so the upload is rejected.
    #[error("CSV has no data rows")]
    EmptyInput,

    /// `row` is 1-based and does not count the header.
    #[error("invalid value {value:?} in column {column} at row {row}")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },

    /// Mean of a column came out non-finite; never stored.
    #[error("average of column {0} is not a finite number")]
    UndefinedAverage(String),

    #[error("summary {0} not found")]
    NotFound(i64),

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Store held more records than the retention ceiling after eviction.
    #[error("retention violated: {count} records stored, ceiling is {ceiling}")]
    RetentionViolation { count: u64, ceiling: u32 },

    #[error("storage: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("decode stored summary: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    /// True for caller mistakes (bad upload, unknown id, unrenderable record).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Csv(_)
                | Error::MissingColumn(_)
                | Error::EmptyInput
                | Error::InvalidValue { .. }
                | Error::UndefinedAverage(_)
                | Error::NotFound(_)
                | Error::InvalidRecord(_)
        )
    }
}
