//! The router value and the request lifecycle.
//!
//! # Responsibilities
//! - Build an immutable [`Router`] from service declarations ([`RouterBuilder`])
//! - Validate content types, realms and operation shapes at registration
//! - Run each request through resolve, authorize, bind, invoke, negotiate, respond
//!
//! # Design Decisions
//! - No global state: the router is built once and shared by reference
//! - Registration errors are returned; the caller decides whether to abort
//! - Every request error sets exactly one response and stops processing
//! - Operation faults are returned to the transport boundary, not handled here

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use crate::binding::{bind, BindError, BodySource};
use crate::codec::{Marshaller, Marshallers, APPLICATION_JSON};
use crate::dispatch::negotiate::{accepts_gzip, consumed_type, produced_type};
use crate::config::schema::ServiceConfig;
use crate::dispatch::operation::{InvokeError, OperationTable};
use crate::docs::Documentor;
use crate::endpoint::declaration::ServiceDeclaration;
use crate::endpoint::descriptor::{
    join_path, EndpointDescriptor, EndpointId, ServiceDescriptor, ServiceId,
};
use crate::endpoint::types::HttpMethod;
use crate::error::{ConfigurationError, DispatchError, RequestError, INTERNAL_ERROR_MESSAGE};
use crate::http::context::RequestContext;
use crate::http::request::X_REQUEST_ID;
use crate::hypermedia::{Decorators, EntityMetadata, EntityTable, HypermediaDecorator};
use crate::routing::{resolve, Registry, RouteMatch};
use crate::security::{Authorizer, Authorizers};

/// Collects collaborators and service declarations, then freezes them into a [`Router`].
///
/// Collaborators (marshallers, authorizers) must be registered before the
/// services that use them. After a registration error the builder should be
/// discarded.
#[derive(Default)]
pub struct RouterBuilder {
    registry: Registry,
    marshallers: Marshallers,
    authorizers: Authorizers,
    decorators: Decorators,
    entities: EntityTable,
    documentor: Option<Arc<dyn Documentor>>,
    docs_routes: HashSet<String>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_marshaller(
        &mut self,
        content_type: &str,
        marshaller: impl Marshaller + 'static,
    ) -> &mut Self {
        self.marshallers.register(content_type, Arc::new(marshaller));
        self
    }

    pub fn register_authorizer(
        &mut self,
        realm: impl Into<String>,
        authorizer: impl Authorizer + 'static,
    ) -> &mut Self {
        self.authorizers.register(realm, Arc::new(authorizer));
        self
    }

    pub fn register_decorator(
        &mut self,
        content_type: &str,
        decorator: impl HypermediaDecorator + 'static,
    ) -> &mut Self {
        self.decorators.register(content_type, Arc::new(decorator));
        self
    }

    /// Hypermedia metadata for the entity type named `type_name` (e.g. `State`).
    pub fn register_entity(&mut self, type_name: impl Into<String>, entity: EntityMetadata) -> &mut Self {
        self.entities.insert(type_name.into(), entity);
        self
    }

    pub fn register_documentor(&mut self, documentor: impl Documentor + 'static) -> &mut Self {
        self.documentor = Some(Arc::new(documentor));
        self
    }

    pub fn register(&mut self, service: ServiceDeclaration) -> Result<(), ConfigurationError> {
        self.register_on_path("", service)
    }

    /// Register `service` with its root mounted under `mount`.
    pub fn register_on_path(
        &mut self,
        mount: &str,
        service: ServiceDeclaration,
    ) -> Result<(), ConfigurationError> {
        let consumes = or_json(service.consumes);
        let produces = or_json(service.produces);
        for content_type in consumes.iter().chain(&produces) {
            self.ensure_marshaller(content_type)?;
        }

        if let Some(realm) = &service.realm {
            if !self.authorizers.contains(realm) {
                return Err(ConfigurationError::UnknownRealm(realm.clone()));
            }
        }

        let descriptor = ServiceDescriptor {
            id: ServiceId(self.registry.services().len()),
            name: service.name,
            root: join_path(&[mount, &service.root]),
            consumes,
            produces,
            realm: service.realm,
            gzip: service.gzip,
            docs_path: service.docs_path,
        };

        // 1. Endpoints
        let mut endpoints = Vec::with_capacity(service.endpoints.len());
        for (offset, decl) in service.endpoints.into_iter().enumerate() {
            for content_type in decl.consumes.iter().chain(&decl.produces) {
                self.ensure_marshaller(content_type)?;
            }
            let id = EndpointId(self.registry.endpoints().len() + offset);
            endpoints.push(EndpointDescriptor::build(id, &descriptor, decl)?);
        }

        // 2. Service, then endpoints in declaration order
        if let Some(docs) = &descriptor.docs_path {
            self.docs_routes.insert(join_path(&[&descriptor.root, docs]));
        }
        tracing::info!(
            service = %descriptor.name,
            root = %descriptor.root,
            endpoints = endpoints.len(),
            "Registering service"
        );
        self.registry.add_service(descriptor)?;
        for endpoint in endpoints {
            self.registry.add_endpoint(endpoint)?;
        }
        Ok(())
    }

    /// Register every configured service, binding endpoints to `operations` by name.
    pub fn register_config(
        &mut self,
        services: &[ServiceConfig],
        operations: &OperationTable,
    ) -> Result<(), ConfigurationError> {
        for service in services {
            self.register(service.to_declaration(operations)?)?;
        }
        Ok(())
    }

    fn ensure_marshaller(&mut self, content_type: &str) -> Result<(), ConfigurationError> {
        if self.marshallers.ensure(content_type) {
            Ok(())
        } else {
            Err(ConfigurationError::UnknownContentType(content_type.to_string()))
        }
    }

    pub fn build(self) -> Router {
        Router {
            registry: self.registry,
            marshallers: self.marshallers,
            authorizers: self.authorizers,
            decorators: self.decorators,
            entities: self.entities,
            documentor: self.documentor,
            docs_routes: self.docs_routes,
        }
    }
}

fn or_json(types: Vec<String>) -> Vec<String> {
    if types.is_empty() {
        vec![APPLICATION_JSON.to_string()]
    } else {
        types
    }
}

/// Immutable routing table plus collaborators. Shared read-only by all requests.
pub struct Router {
    registry: Registry,
    marshallers: Marshallers,
    authorizers: Authorizers,
    decorators: Decorators,
    entities: EntityTable,
    documentor: Option<Arc<dyn Documentor>>,
    docs_routes: HashSet<String>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    pub fn resolve(&self, method: HttpMethod, url: &str) -> Option<RouteMatch<'_>> {
        resolve(&self.registry, method, url)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn services(&self) -> &[ServiceDescriptor] {
        self.registry.services()
    }

    pub fn endpoints(&self) -> &[EndpointDescriptor] {
        self.registry.endpoints()
    }

    /// Output of the registered documentor over every descriptor.
    pub fn documentation(&self) -> Option<Value> {
        self.documentor
            .as_ref()
            .map(|d| d.document(self.registry.services(), self.registry.endpoints()))
    }

    /// Run one request through the lifecycle, leaving the outcome on the
    /// context's response builder. Only operation faults are returned.
    pub fn dispatch(&self, ctx: &mut RequestContext) -> Result<(), DispatchError> {
        let request_id = ctx.header(X_REQUEST_ID).unwrap_or("unknown").to_string();

        if ctx.method() == HttpMethod::Get && self.serve_docs(ctx) {
            return Ok(());
        }

        // 1. Resolve
        let Some(matched) = resolve(&self.registry, ctx.method(), ctx.url()) else {
            tracing::warn!(request_id = %request_id, path = %ctx.path(), "No endpoint matched");
            ctx.response_mut().fail(&RequestError::NotFound);
            return Ok(());
        };
        let endpoint = matched.endpoint;
        let Some(service) = self.registry.service(endpoint.service) else {
            ctx.response_mut().fail(&RequestError::NotFound);
            return Ok(());
        };
        ctx.set_route(matched.path_args, matched.query_args, matched.token);

        tracing::debug!(
            request_id = %request_id,
            endpoint = %endpoint.name,
            signature = %endpoint.signature,
            "Endpoint resolved"
        );

        // 2. Authorize
        if let Some(realm) = &service.realm {
            if !self.authorize(ctx, realm) {
                tracing::debug!(request_id = %request_id, realm = %realm, "Authorization rejected");
                return Ok(());
            }
        }

        // 3. Bind
        let consumes = consumed_type(endpoint, service, ctx.headers());
        let produces = produced_type(endpoint, service, ctx.headers());
        ctx.set_consumes(consumes.clone());
        ctx.set_produces(produces.clone());

        let body = ctx.body().clone();
        let source = match self.marshallers.get(&consumes) {
            Some(marshaller) if endpoint.method.takes_body() => Some(BodySource {
                marshaller: marshaller.as_ref(),
                content_type: &consumes,
                bytes: &body,
            }),
            _ => None,
        };
        let args = match bind(endpoint, ctx.path_args(), ctx.query_args(), source) {
            Ok(args) => args,
            Err(err) => {
                tracing::warn!(request_id = %request_id, error = %err, "Argument binding failed");
                let message = match err {
                    BindError::Decode { .. } => unmarshal_message(&consumes),
                    other => other.to_string(),
                };
                ctx.response_mut().fail(&RequestError::BadRequest(message));
                return Ok(());
            }
        };

        // 4. Invoke
        let entity = match endpoint.operation.invoke(ctx, args) {
            Ok(entity) => entity,
            Err(InvokeError::Fault(fault)) => return Err(DispatchError::Fault(fault)),
            Err(InvokeError::Bind(reason)) => {
                tracing::warn!(request_id = %request_id, reason = %reason, "Payload conversion failed");
                ctx.response_mut()
                    .fail(&RequestError::BadRequest(unmarshal_message(&consumes)));
                return Ok(());
            }
            Err(InvokeError::Encode(reason)) => {
                tracing::error!(request_id = %request_id, reason = %reason, "Entity conversion failed");
                ctx.response_mut()
                    .fail(&RequestError::InternalServerError(marshal_message(&produces)));
                return Ok(());
            }
        };

        // 5. Negotiate
        let returns_entity = entity.is_some();
        if let Some(value) = entity {
            if let Err(reason) = self.write_entity(ctx, endpoint, value, &produces) {
                tracing::error!(
                    request_id = %request_id,
                    content_type = %produces,
                    reason = %reason,
                    "Response encoding failed"
                );
                ctx.response_mut()
                    .fail(&RequestError::InternalServerError(marshal_message(&produces)));
                return Ok(());
            }
        }

        // 6. Respond
        let compress = endpoint.gzip && accepts_gzip(ctx.headers());
        let response = ctx.response_mut();
        if returns_entity {
            if response.status().is_none() {
                response.set_status(axum::http::StatusCode::OK);
            }
        } else if !response.is_set() {
            response.set_status(endpoint.method.default_status());
        }
        response.set_compress(compress);
        Ok(())
    }

    fn authorize(&self, ctx: &mut RequestContext, realm: &str) -> bool {
        let Some(authorizer) = self.authorizers.get(realm) else {
            // Realms are checked at registration; treat a gap as a rejection.
            ctx.response_mut()
                .fail(&RequestError::InternalServerError(INTERNAL_ERROR_MESSAGE.to_string()));
            return false;
        };
        let token = ctx.token().map(str::to_owned);
        let method = ctx.method();
        authorizer.authorize(token.as_deref(), realm, method, ctx.response_mut())
    }

    fn write_entity(
        &self,
        ctx: &mut RequestContext,
        endpoint: &EndpointDescriptor,
        value: Value,
        produces: &str,
    ) -> Result<(), String> {
        let value = match self.decorators.get(produces) {
            Some(decorator) => {
                let prefix = format!("http://{}", ctx.header("host").unwrap_or_default());
                let entity = endpoint
                    .output
                    .as_ref()
                    .and_then(|output| self.entities.get(&output.name));
                decorator.decorate(&prefix, value, entity)
            }
            None => value,
        };

        let marshaller = self
            .marshallers
            .get(produces)
            .ok_or_else(|| format!("no marshaller registered for {produces}"))?;
        let bytes = marshaller
            .encode(&value, produces)
            .map_err(|e| e.to_string())?;
        ctx.response_mut().set_payload(bytes, produces);
        Ok(())
    }

    fn serve_docs(&self, ctx: &mut RequestContext) -> bool {
        let path = ctx.path().trim_matches('/');
        if !self.docs_routes.contains(path) {
            return false;
        }
        let Some(doc) = self.documentation() else {
            return false;
        };
        match serde_json::to_vec(&doc) {
            Ok(bytes) => {
                ctx.response_mut()
                    .set_status(axum::http::StatusCode::OK)
                    .set_payload(bytes, APPLICATION_JSON);
            }
            Err(err) => {
                tracing::error!(error = %err, "Documentation encoding failed");
                ctx.response_mut()
                    .fail(&RequestError::InternalServerError(INTERNAL_ERROR_MESSAGE.to_string()));
            }
        }
        true
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("services", &self.registry.services().len())
            .field("endpoints", &self.registry.endpoints().len())
            .field("marshallers", &self.marshallers)
            .field("authorizers", &self.authorizers)
            .field("decorators", &self.decorators)
            .finish()
    }
}

fn unmarshal_message(content_type: &str) -> String {
    format!("Error unmarshalling data using {content_type}")
}

fn marshal_message(content_type: &str) -> String {
    format!("{INTERNAL_ERROR_MESSAGE} Could not marshal data using {content_type}")
}
