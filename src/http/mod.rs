//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, URL decode, body read)
//!     → context.rs (per-request state, bearer token)
//!     → [dispatch::Router runs the endpoint lifecycle]
//!     → response.rs (write-once response, gzip marker)
//!     → Send to client
//! ```

pub mod context;
pub mod request;
pub mod response;
pub mod server;

pub use context::RequestContext;
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::{Compress, ResponseBuilder};
pub use server::HttpServer;
