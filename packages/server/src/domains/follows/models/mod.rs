pub mod follow;

pub use follow::{FollowFilter, FollowRecord};
