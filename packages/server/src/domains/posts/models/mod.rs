pub mod post;

pub use post::{PostFilter, PostSummary, MAX_SEARCH_LEN};
