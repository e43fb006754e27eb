//! Argument binding.
//!
//! Turns matched path/query strings and the request body into the ordered
//! argument list an operation is invoked with.

pub mod binder;
pub mod scalar;

pub use binder::{bind, BindError, BodySource, BoundArg};
pub use scalar::{CoercionError, Scalar};
