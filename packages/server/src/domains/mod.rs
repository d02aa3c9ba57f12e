// Business domains
pub mod comments;
pub mod follows;
pub mod notifications;
pub mod posts;
pub mod tag;
