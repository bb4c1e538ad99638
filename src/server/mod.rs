//! Axum-based HTTP server for math-advisor.
//!
//! Serves the single upload page and the solve endpoints that feed the
//! uploaded image through the packager and the AI gateway.
//!
//! # Components
//!
//! - `handlers`: Page, solve, health and metrics endpoints.
//! - `middleware`: Request ID tracking.
//! - `page`: HTML rendering of the upload page and results.
//! - `routes`: The main router configuration that ties everything together.
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod handlers;
mod middleware;
mod page;
mod routes;

pub use handlers::{SolveResponse, NO_IMAGE_MESSAGE, UPLOAD_TOO_LARGE_MESSAGE};
pub use routes::{create_router, AppState};
