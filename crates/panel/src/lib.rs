pub mod assemble;
pub mod error;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod panel;

pub use assemble::*;
pub use error::*;
pub use panel::*;
