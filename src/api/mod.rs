//! HTTP API and UI server.

pub mod assets;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use server::{router, serve};
pub use state::AppState;
