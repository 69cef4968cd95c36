pub mod planar;
pub mod vec;

pub use planar::*;
pub use vec::*;
