// HTTP routes
pub mod comments;
pub mod follows;
pub mod health;
pub mod notifications;
pub mod posts;
pub mod tags;

pub use comments::*;
pub use follows::*;
pub use health::*;
pub use notifications::*;
pub use posts::*;
pub use tags::*;
