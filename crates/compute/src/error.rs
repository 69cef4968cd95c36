use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputeError {
    #[error("length mismatch: expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("need at least {required} observations, got {actual}")]
    TooFewObservations { required: usize, actual: usize },

    #[error("{what} has zero variance")]
    ZeroVariance { what: &'static str },

    #[error("neighbor index {index} out of range for {n} regions")]
    NeighborOutOfRange { index: usize, n: usize },

    #[error("need at least {required} classes, got {actual}")]
    TooFewClasses { required: usize, actual: usize },

    #[error("input contains non-finite values")]
    NonFinite,
}

pub type ComputeResult<T> = Result<T, ComputeError>;
