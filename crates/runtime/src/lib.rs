pub mod animation;
pub mod controls;
pub mod graph;
pub mod resolve;

pub use animation::*;
pub use controls::*;
pub use graph::*;
pub use resolve::*;
