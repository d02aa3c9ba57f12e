pub mod actions;
pub mod models;

// Re-export commonly used types
pub use models::{FollowFilter, FollowRecord};
