//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Registration:
//!     → one info event per endpoint (method, signature, service)
//!
//! Per request (http::server, dispatch::router):
//!     → debug/warn/error events tagged with request_id
//!     → router_requests_total / router_request_duration_seconds
//! ```
//!
//! # Design Decisions
//! - Subscriber and exporter are installed by the binary, never by the library
//! - Client-facing error bodies stay fixed; details only reach the log

pub mod logging;
pub mod metrics;
