//! Tag actions - read paths over the tag store.

mod queries;

pub use queries::list_tags;
