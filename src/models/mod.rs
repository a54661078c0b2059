// Core data model: segments, tasks, categories and the watch collection

pub mod category;
pub mod segment;
pub mod task;
pub mod watch;

pub use category::*;
pub use segment::*;
pub use task::*;
pub use watch::*;
