pub mod date;
pub mod duration;

pub use date::*;
pub use duration::*;
