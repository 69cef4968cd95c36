use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("income table is missing required column '{column}'")]
    MissingColumn { column: &'static str },

    #[error("income table column '{header}' is not a year")]
    InvalidYearColumn { header: String },

    #[error("income table has no year columns")]
    NoYears,

    #[error("income table year columns are not contiguous: {after} is followed by {found}")]
    NonContiguousYears { after: i32, found: i32 },

    #[error("income table row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected GeoJSON FeatureCollection")]
    NotAFeatureCollection,

    #[error("invalid feature at index {index}: {reason}")]
    InvalidFeature { index: usize, reason: String },
}

pub type FormatResult<T> = Result<T, FormatError>;
