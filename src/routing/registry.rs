//! Endpoint registry.
//!
//! # Responsibilities
//! - Own every service and endpoint descriptor
//! - Enforce registration-time uniqueness rules
//! - Expose exact and fallback lookup
//!
//! # Design Decisions
//! - Filled while the router is built, read-only afterwards (no locking)
//! - Exact lookup is keyed `METHOD:path` and only holds parameter-free endpoints
//! - Fallback lookup scans one method's endpoints in registration order;
//!   the uniqueness rules keep that order from mattering
//! - A parameter-free pattern never clashes with a parameterized one: exact
//!   lookup runs first and always wins

use std::collections::HashMap;

use crate::endpoint::descriptor::{EndpointDescriptor, ServiceDescriptor, ServiceId};
use crate::endpoint::types::HttpMethod;
use crate::error::ConfigurationError;

#[derive(Debug, Default)]
pub struct Registry {
    services: Vec<ServiceDescriptor>,
    endpoints: Vec<EndpointDescriptor>,
    exact: HashMap<String, usize>,
    by_method: HashMap<HttpMethod, Vec<usize>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_service(&mut self, service: ServiceDescriptor) -> Result<ServiceId, ConfigurationError> {
        if self.services.iter().any(|s| s.name == service.name) {
            return Err(ConfigurationError::DuplicateService(service.name));
        }
        let id = service.id;
        self.services.push(service);
        Ok(id)
    }

    /// Check `endpoint` against every registered endpoint of the same method
    /// and store it.
    pub fn add_endpoint(&mut self, endpoint: EndpointDescriptor) -> Result<(), ConfigurationError> {
        self.check_unique(&endpoint)?;

        let index = self.endpoints.len();
        if !endpoint.has_path_params() {
            self.exact.insert(exact_key(endpoint.method, &endpoint.path), index);
        }
        self.by_method.entry(endpoint.method).or_default().push(index);

        tracing::info!(
            method = %endpoint.method,
            signature = %endpoint.signature,
            service = ?endpoint.service,
            "Registered endpoint"
        );
        self.endpoints.push(endpoint);
        Ok(())
    }

    fn check_unique(&self, candidate: &EndpointDescriptor) -> Result<(), ConfigurationError> {
        for existing in self.same_method(candidate.method) {
            // 1. Identical signature
            if existing.signature == candidate.signature {
                return Err(ConfigurationError::DuplicateSignature {
                    method: candidate.method.to_string(),
                    signature: candidate.signature.clone(),
                });
            }

            // 2. Same structure under different parameter names
            if !existing.variable_length
                && !candidate.variable_length
                && existing.root == candidate.root
                && existing.segment_count == candidate.segment_count
                && existing.non_parameter_segments == candidate.non_parameter_segments
            {
                return Err(ConfigurationError::DuplicateStructure {
                    method: candidate.method.to_string(),
                    signature: candidate.signature.clone(),
                    existing: existing.signature.clone(),
                });
            }

            // 3. Fixed patterns some request path could satisfy both ways
            if !existing.variable_length
                && !candidate.variable_length
                && existing.has_path_params()
                && candidate.has_path_params()
                && existing.segment_count == candidate.segment_count
                && !literals_conflict(existing, candidate)
            {
                return Err(ConfigurationError::AmbiguousSignature {
                    method: candidate.method.to_string(),
                    signature: candidate.signature.clone(),
                    existing: existing.signature.clone(),
                });
            }

            // 4. Overlapping variable-length roots
            if (existing.variable_length || candidate.variable_length)
                && roots_overlap(&existing.root, &candidate.root)
            {
                return Err(ConfigurationError::AmbiguousVariableRoot {
                    root: candidate.root.clone(),
                    existing: existing.root.clone(),
                });
            }
        }
        Ok(())
    }

    /// Direct lookup for a parameter-free path.
    pub fn exact_lookup(&self, method: HttpMethod, path: &str) -> Option<&EndpointDescriptor> {
        self.exact
            .get(&exact_key(method, path))
            .map(|&index| &self.endpoints[index])
    }

    /// First endpoint of `method`, in registration order, accepted by `matches`.
    pub fn fallback_lookup<F>(&self, method: HttpMethod, mut matches: F) -> Option<&EndpointDescriptor>
    where
        F: FnMut(&EndpointDescriptor) -> bool,
    {
        self.same_method(method).find(|endpoint| matches(endpoint))
    }

    fn same_method(&self, method: HttpMethod) -> impl Iterator<Item = &EndpointDescriptor> {
        self.by_method
            .get(&method)
            .into_iter()
            .flatten()
            .map(move |&index| &self.endpoints[index])
    }

    pub fn service(&self, id: ServiceId) -> Option<&ServiceDescriptor> {
        self.services.iter().find(|s| s.id == id)
    }

    pub fn services(&self) -> &[ServiceDescriptor] {
        &self.services
    }

    pub fn endpoints(&self) -> &[EndpointDescriptor] {
        &self.endpoints
    }

    /// Endpoints registered under `service`, in registration order.
    pub fn endpoints_of(&self, service: ServiceId) -> impl Iterator<Item = &EndpointDescriptor> {
        self.endpoints.iter().filter(move |e| e.service == service)
    }
}

fn exact_key(method: HttpMethod, path: &str) -> String {
    format!("{}:{}", method, path.trim_matches('/'))
}

/// True when some segment index holds a different literal in each pattern.
fn literals_conflict(a: &EndpointDescriptor, b: &EndpointDescriptor) -> bool {
    a.non_parameter_segments.iter().any(|(index, literal)| {
        b.non_parameter_segments
            .get(index)
            .is_some_and(|other| other != literal)
    })
}

/// True when one root equals the other or is a whole-segment prefix of it.
fn roots_overlap(a: &str, b: &str) -> bool {
    fn is_prefix(short: &str, long: &str) -> bool {
        short.is_empty() || long == short || long.starts_with(&format!("{short}/"))
    }
    is_prefix(a, b) || is_prefix(b, a)
}
