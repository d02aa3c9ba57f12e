//! Post actions - read paths over the post store.

mod queries;

pub use queries::list_posts;
