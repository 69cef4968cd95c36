use compute::ComputeError;
use foundation::Year;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error(transparent)]
    Compute(#[from] ComputeError),

    #[error("year {0} is outside the dataset")]
    MissingYear(Year),

    #[error("no state holds rank {rank} in {year}")]
    NoRankHolder { rank: u32, year: Year },

    #[error("{0} has no drawable outline")]
    MissingOutline(String),
}

pub type ChartResult<T> = Result<T, ChartError>;
