pub mod comment;

pub use comment::{Comment, CommentFilter, CommentRow, ParentRef};
