//! Follow actions - read paths over the follow graph.

mod queries;

pub use queries::{list_followers, list_following};
