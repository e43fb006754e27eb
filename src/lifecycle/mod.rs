//! Process lifecycle.
//!
//! # Data Flow
//! ```text
//! startup.rs:  RouterConfig + Router → metrics exporter → signal task → bind → serve
//! signals.rs:  Ctrl-C → Shutdown::trigger
//! shutdown.rs: broadcast → HttpServer stops accepting, drains, returns
//! ```
//!
//! # Design Decisions
//! - The router is fully built before the listener binds
//! - The server subscribes to shutdown before the signal task starts

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
