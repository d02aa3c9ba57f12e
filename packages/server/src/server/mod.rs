// HTTP server setup (Axum + JSON)
pub mod app;
pub mod error;
pub mod extract;
pub mod routes;

pub use app::*;
pub use extract::{ApiPath, ApiQuery};
