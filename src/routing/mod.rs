//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     EndpointDeclaration
//!     → descriptor.rs (parse + validate)
//!     → registry.rs (uniqueness checks, exact keys)
//!     → Freeze inside the immutable Router
//!
//! Incoming Request (method, decoded path, query):
//!     → matcher.rs (exact lookup, then structural scan)
//!     → Return: RouteMatch or no match
//! ```
//!
//! # Design Decisions
//! - Registry compiled at startup, immutable at runtime
//! - No regex in the hot path (segment comparison only)
//! - Deterministic: same input always matches same endpoint

pub mod matcher;
pub mod registry;

pub use matcher::{resolve, RouteMatch, TOKEN_PARAM};
pub use registry::Registry;
