pub mod actions;
pub mod models;
pub mod tree;

// Re-export commonly used types
pub use models::{Comment, CommentFilter, ParentRef};
pub use tree::{build_forest, CommentNode};
