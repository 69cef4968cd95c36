pub mod directional;
pub mod rank;
pub mod spatial;
pub mod statistics;
pub mod temporal;

pub use directional::*;
pub use rank::*;
pub use spatial::*;
pub use statistics::*;
pub use temporal::*;
