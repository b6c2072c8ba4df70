//! HTTP API subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, middleware)
//!     → request.rs (request ID assigned and propagated)
//!     → handler → ChainService → NodeManager
//!     → response.rs (JSON envelope, error → status mapping)
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdExt, X_REQUEST_ID};
pub use response::ApiResponse;
pub use server::{BlockHeight, HttpServer};
