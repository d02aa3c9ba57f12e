//! Comment actions - read paths over the comment store.

mod queries;

pub use queries::{list_comment_threads, list_comments_by_author};
