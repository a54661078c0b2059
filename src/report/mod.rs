// Reporting over tasks: activity ordering, tagset grouping and week buckets

pub mod activity;
pub mod tagset;
pub mod weekly;

pub use activity::*;
pub use tagset::*;
pub use weekly::*;
