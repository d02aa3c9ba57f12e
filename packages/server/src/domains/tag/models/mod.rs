pub mod tag;

pub use tag::{TagFilter, TagSummary};
