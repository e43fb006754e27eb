//! Validated, immutable service and endpoint descriptors.
//!
//! # Responsibilities
//! - Normalize a declaration into the structure the registry and matcher use
//! - Derive the operation shape a declaration implies and check the bound
//!   operation against it
//!
//! # Design Decisions
//! - Descriptors are built once at registration and never change afterwards
//! - Service roots (plus an optional mount prefix) are folded into the
//!   endpoint signature, so matching never has to know about services

use std::collections::BTreeMap;
use std::fmt;

use crate::dispatch::operation::{ArgKind, Operation, OperationSignature};
use crate::endpoint::declaration::EndpointDeclaration;
use crate::endpoint::signature::parse_signature;
use crate::endpoint::types::{GzipPolicy, HttpMethod, Param, TypeDecl};
use crate::error::ConfigurationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EndpointId(pub usize);

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ep-{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    pub id: ServiceId,
    pub name: String,
    /// Normalized root, slashes trimmed, mount prefix included.
    pub root: String,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    pub realm: Option<String>,
    pub gzip: bool,
    pub docs_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EndpointDescriptor {
    pub id: EndpointId,
    pub name: String,
    pub method: HttpMethod,
    /// Normalized pattern including the query declaration.
    pub signature: String,
    /// Path part of `signature`.
    pub path: String,
    pub root: String,
    pub non_parameter_segments: BTreeMap<usize, String>,
    pub path_params: Vec<Param>,
    pub query_params: Vec<Param>,
    pub segment_count: usize,
    pub variable_length: bool,
    pub input: Option<TypeDecl>,
    pub output: Option<TypeDecl>,
    pub role: Option<String>,
    pub security_scheme: Option<String>,
    pub consumes: Option<String>,
    pub produces: Option<String>,
    pub gzip_policy: GzipPolicy,
    /// `gzip_policy` resolved against the owning service.
    pub gzip: bool,
    pub service: ServiceId,
    pub operation: Operation,
}

impl EndpointDescriptor {
    /// Validate `decl` under `service` and build its descriptor.
    pub fn build(
        id: EndpointId,
        service: &ServiceDescriptor,
        decl: EndpointDeclaration,
    ) -> Result<Self, ConfigurationError> {
        let name = decl.display_name();
        let parsed = parse_signature(&join_path(&[&service.root, &decl.path]))?;

        let output = decl
            .output
            .as_deref()
            .map(|expr| TypeDecl::parse(expr, "output", &parsed.signature))
            .transpose()?;

        let input = if decl.method.takes_body() {
            let expr = decl
                .postdata
                .as_deref()
                .ok_or_else(|| ConfigurationError::MissingDeclaration {
                    endpoint: name.clone(),
                    field: "postdata",
                })?;
            Some(TypeDecl::parse(expr, "postdata", &parsed.signature)?)
        } else {
            None
        };

        let operation = decl
            .operation
            .ok_or_else(|| ConfigurationError::MissingDeclaration {
                endpoint: name.clone(),
                field: "operation",
            })?;

        let descriptor = Self {
            id,
            name,
            method: decl.method,
            signature: parsed.signature,
            path: parsed.path,
            root: parsed.root,
            non_parameter_segments: parsed.literals,
            path_params: parsed.path_params,
            query_params: parsed.query_params,
            segment_count: parsed.segment_count,
            variable_length: parsed.variable_length,
            input,
            output,
            role: decl.role,
            security_scheme: decl.security,
            consumes: decl.consumes,
            produces: decl.produces,
            gzip_policy: decl.gzip,
            gzip: decl.gzip.resolve(service.gzip),
            service: service.id,
            operation,
        };

        let expected = descriptor.expected_operation();
        if !expected.accepts(descriptor.operation.signature()) {
            return Err(ConfigurationError::OperationMismatch {
                endpoint: descriptor.name,
                expected: expected.to_string(),
                found: descriptor.operation.signature().to_string(),
            });
        }

        Ok(descriptor)
    }

    /// The operation shape this endpoint's declaration implies:
    /// `[body] path.. query.. -> [output]`.
    pub fn expected_operation(&self) -> OperationSignature {
        let mut args = Vec::new();
        if let Some(input) = &self.input {
            args.push(ArgKind::Payload(input.clone()));
        }
        for param in &self.path_params {
            if self.variable_length {
                args.push(ArgKind::Variadic(param.param_type));
            } else {
                args.push(ArgKind::Scalar(param.param_type));
            }
        }
        for param in &self.query_params {
            args.push(ArgKind::Scalar(param.param_type));
        }
        OperationSignature {
            args,
            returns: self.output.clone(),
        }
    }

    pub fn has_path_params(&self) -> bool {
        !self.path_params.is_empty()
    }
}

/// Join path pieces with single slashes, dropping empty pieces.
pub fn join_path(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|part| part.trim_matches('/'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
