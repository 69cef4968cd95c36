use compute::ComputeError;
use formats::FormatError;
use foundation::Year;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("duplicate STATE_FIPS {fips} in {side}")]
    DuplicateFips { fips: u32, side: &'static str },

    #[error("STATE_FIPS {fips} ({name}) has income data but no geometry")]
    MissingGeometry { fips: u32, name: String },

    #[error("STATE_FIPS {fips} ({abbr}) has geometry but no income data")]
    MissingIncome { fips: u32, abbr: String },

    #[error("states without contiguous neighbors: {names}")]
    Islands { names: String },

    #[error("income table has no states")]
    Empty,

    #[error("mean income is zero in {year}")]
    ZeroMean { year: Year },

    #[error(transparent)]
    Compute(#[from] ComputeError),
}

pub type AssemblyResult<T> = Result<T, AssemblyError>;
