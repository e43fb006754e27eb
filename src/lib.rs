//! Declarative HTTP endpoint router and dispatcher.
//!
//! Services declare endpoints (method, typed path pattern, input/output types);
//! the [`Router`] resolves each request to exactly one endpoint, coerces its
//! arguments, invokes the bound operation and builds the response.

pub mod binding;
pub mod codec;
pub mod config;
pub mod dispatch;
pub mod docs;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod hypermedia;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::schema::RouterConfig;
pub use dispatch::{Operation, OperationTable, Payload, Router, RouterBuilder};
pub use endpoint::{EndpointDeclaration, HttpMethod, ServiceDeclaration};
pub use error::{ConfigurationError, Fault, RequestError};
pub use http::{HttpServer, RequestContext, ResponseBuilder};
pub use lifecycle::Shutdown;
