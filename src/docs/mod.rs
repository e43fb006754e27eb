//! API description.
//!
//! A [`Documentor`] reads the registered descriptors and produces a
//! machine-readable description. [`EndpointCatalog`] is the built-in one: a
//! JSON listing of services and their endpoints.

use serde::Serialize;
use serde_json::Value;

use crate::endpoint::descriptor::{EndpointDescriptor, ServiceDescriptor};
use crate::endpoint::types::{Param, TypeDecl};

pub trait Documentor: Send + Sync {
    fn document(&self, services: &[ServiceDescriptor], endpoints: &[EndpointDescriptor]) -> Value;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EndpointCatalog;

#[derive(Serialize)]
struct ServiceEntry<'a> {
    name: &'a str,
    root: String,
    consumes: &'a [String],
    produces: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    realm: Option<&'a str>,
    endpoints: Vec<EndpointEntry<'a>>,
}

#[derive(Serialize)]
struct EndpointEntry<'a> {
    name: &'a str,
    method: &'static str,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    postdata: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    security: Option<&'a str>,
    path_params: Vec<ParamEntry<'a>>,
    query_params: Vec<ParamEntry<'a>>,
    variable_length: bool,
}

#[derive(Serialize)]
struct ParamEntry<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    param_type: &'static str,
}

fn params(params: &[Param]) -> Vec<ParamEntry<'_>> {
    params
        .iter()
        .map(|p| ParamEntry {
            name: &p.name,
            param_type: p.param_type.name(),
        })
        .collect()
}

fn type_name(decl: &Option<TypeDecl>) -> Option<String> {
    decl.as_ref().map(ToString::to_string)
}

impl Documentor for EndpointCatalog {
    fn document(&self, services: &[ServiceDescriptor], endpoints: &[EndpointDescriptor]) -> Value {
        let entries: Vec<ServiceEntry<'_>> = services
            .iter()
            .map(|service| ServiceEntry {
                name: &service.name,
                root: format!("/{}", service.root),
                consumes: &service.consumes,
                produces: &service.produces,
                realm: service.realm.as_deref(),
                endpoints: endpoints
                    .iter()
                    .filter(|e| e.service == service.id)
                    .map(|e| EndpointEntry {
                        name: &e.name,
                        method: e.method.as_str(),
                        path: format!("/{}", e.signature),
                        postdata: type_name(&e.input),
                        output: type_name(&e.output),
                        role: e.role.as_deref(),
                        security: e.security_scheme.as_deref(),
                        path_params: params(&e.path_params),
                        query_params: params(&e.query_params),
                        variable_length: e.variable_length,
                    })
                    .collect(),
            })
            .collect();

        serde_json::json!({ "services": entries })
    }
}
