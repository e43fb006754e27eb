//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! RequestContext (method, decoded URL, headers, body)
//!     → router.rs (resolve via routing, authorize via security)
//!     → binding (ordered arguments)
//!     → operation.rs (typed adapter call)
//!     → negotiate.rs (response content type) + hypermedia + codec
//!     → ResponseBuilder
//! ```

pub mod negotiate;
pub mod operation;
pub mod router;

pub use operation::{FromArg, Handler, Operation, OperationSignature, OperationTable, Payload};
pub use router::{Router, RouterBuilder};
