//! HTTP API: routes, handlers, and error responses.

pub mod error;
pub mod handlers;
pub mod routes;

pub use error::{ApiError, ApiResult};
