//! Builder-style service and endpoint declarations.
//!
//! A declaration is what the application states; the router turns it into
//! validated descriptors at registration time.

use crate::dispatch::operation::{Handler, Operation};
use crate::endpoint::types::{GzipPolicy, HttpMethod};

/// A group of endpoints sharing a root, content types and security realm.
#[derive(Debug, Clone)]
pub struct ServiceDeclaration {
    pub(crate) name: String,
    pub(crate) root: String,
    pub(crate) consumes: Vec<String>,
    pub(crate) produces: Vec<String>,
    pub(crate) realm: Option<String>,
    pub(crate) gzip: bool,
    pub(crate) docs_path: Option<String>,
    pub(crate) endpoints: Vec<EndpointDeclaration>,
}

impl ServiceDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: String::new(),
            consumes: Vec::new(),
            produces: Vec::new(),
            realm: None,
            gzip: false,
            docs_path: None,
            endpoints: Vec::new(),
        }
    }

    pub fn root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    /// Add a consumed content type. The first one is the default.
    pub fn consumes(mut self, content_type: impl Into<String>) -> Self {
        self.consumes.push(content_type.into());
        self
    }

    /// Add a produced content type. The first one is the default.
    pub fn produces(mut self, content_type: impl Into<String>) -> Self {
        self.produces.push(content_type.into());
        self
    }

    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    pub fn gzip(mut self, enabled: bool) -> Self {
        self.gzip = enabled;
        self
    }

    /// Serve the registered documentor at `<root>/<path>`.
    pub fn docs_path(mut self, path: impl Into<String>) -> Self {
        self.docs_path = Some(path.into());
        self
    }

    pub fn endpoint(mut self, endpoint: EndpointDeclaration) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// One declared endpoint.
#[derive(Debug, Clone)]
pub struct EndpointDeclaration {
    pub(crate) name: Option<String>,
    pub(crate) method: HttpMethod,
    pub(crate) path: String,
    pub(crate) output: Option<String>,
    pub(crate) postdata: Option<String>,
    pub(crate) role: Option<String>,
    pub(crate) consumes: Option<String>,
    pub(crate) produces: Option<String>,
    pub(crate) gzip: GzipPolicy,
    pub(crate) security: Option<String>,
    pub(crate) operation: Option<Operation>,
}

impl EndpointDeclaration {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            name: None,
            method,
            path: path.into(),
            output: None,
            postdata: None,
            role: None,
            consumes: None,
            produces: None,
            gzip: GzipPolicy::Inherit,
            security: None,
            operation: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn head(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Head, path)
    }

    pub fn options(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Options, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Declared return type, e.g. `State`, `Vec<State>`, `map[string]State`.
    pub fn output(mut self, type_expr: impl Into<String>) -> Self {
        self.output = Some(type_expr.into());
        self
    }

    /// Declared body type for POST and PUT.
    pub fn postdata(mut self, type_expr: impl Into<String>) -> Self {
        self.postdata = Some(type_expr.into());
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn consumes(mut self, content_type: impl Into<String>) -> Self {
        self.consumes = Some(content_type.into());
        self
    }

    pub fn produces(mut self, content_type: impl Into<String>) -> Self {
        self.produces = Some(content_type.into());
        self
    }

    pub fn gzip(mut self, enabled: bool) -> Self {
        self.gzip = GzipPolicy::from(Some(enabled));
        self
    }

    pub fn gzip_policy(mut self, policy: GzipPolicy) -> Self {
        self.gzip = policy;
        self
    }

    pub fn security(mut self, scheme: impl Into<String>) -> Self {
        self.security = Some(scheme.into());
        self
    }

    pub fn operation<H, Args>(mut self, handler: H) -> Self
    where
        H: Handler<Args>,
    {
        self.operation = Some(Operation::new(handler));
        self
    }

    pub(crate) fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = Some(operation);
        self
    }

    /// Name used in logs and for operation lookup: the explicit name, or `METHOD path`.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{} {}", self.method, self.path))
    }
}
