pub mod error;
pub mod income_table;
pub mod state_shapes;

pub use error::*;
pub use income_table::*;
pub use state_shapes::*;
