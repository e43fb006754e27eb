//! Endpoint vocabulary: declarations, parsed signatures and descriptors.

pub mod declaration;
pub mod descriptor;
pub mod signature;
pub mod types;

pub use declaration::{EndpointDeclaration, ServiceDeclaration};
pub use descriptor::{EndpointDescriptor, EndpointId, ServiceDescriptor, ServiceId};
pub use types::{GzipPolicy, HttpMethod, ParamType, TypeDecl, TypeShape};
