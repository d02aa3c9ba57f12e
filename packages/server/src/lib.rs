// Blog read core
//
// Paginated listing for posts, tags, comments, follows and notifications,
// plus threaded comment reconstruction. Every list read goes through
// common::pagination; stores are injected through kernel::BaseStoreReader.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
