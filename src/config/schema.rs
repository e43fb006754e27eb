//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::dispatch::operation::OperationTable;
use crate::endpoint::declaration::{EndpointDeclaration, ServiceDeclaration};
use crate::endpoint::types::{GzipPolicy, HttpMethod};
use crate::error::ConfigurationError;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// HTTP server settings.
    pub server: ServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Declared services and their endpoints.
    pub services: Vec<ServiceConfig>,
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8787").
    pub bind_address: String,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,

    /// Largest request body read into memory.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8787".to_string(),
            request_timeout_secs: 30,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// One `[[services]]` table.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub root: String,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    pub realm: Option<String>,
    pub gzip: bool,
    pub docs_path: Option<String>,
    pub endpoints: Vec<EndpointConfig>,
}

/// One `[[services.endpoints]]` table.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EndpointConfig {
    /// Operation lookup key.
    pub name: String,
    pub method: Option<String>,
    pub path: Option<String>,
    pub output: Option<String>,
    pub postdata: Option<String>,
    pub role: Option<String>,
    pub consumes: Option<String>,
    pub produces: Option<String>,
    /// Absent means inherit from the service.
    pub gzip: Option<bool>,
    pub security: Option<String>,
}

impl ServiceConfig {
    /// Turn this table into a declaration, binding each endpoint to the
    /// operation registered under its name.
    pub fn to_declaration(
        &self,
        operations: &OperationTable,
    ) -> Result<ServiceDeclaration, ConfigurationError> {
        let mut service = ServiceDeclaration::new(&self.name)
            .root(&self.root)
            .gzip(self.gzip);
        for content_type in &self.consumes {
            service = service.consumes(content_type);
        }
        for content_type in &self.produces {
            service = service.produces(content_type);
        }
        if let Some(realm) = &self.realm {
            service = service.realm(realm);
        }
        if let Some(docs_path) = &self.docs_path {
            service = service.docs_path(docs_path);
        }

        for endpoint in &self.endpoints {
            service = service.endpoint(endpoint.to_declaration(operations)?);
        }
        Ok(service)
    }
}

impl EndpointConfig {
    pub fn to_declaration(
        &self,
        operations: &OperationTable,
    ) -> Result<EndpointDeclaration, ConfigurationError> {
        let method: HttpMethod = self
            .method
            .as_deref()
            .ok_or_else(|| self.missing("method"))?
            .parse()?;
        let path = self.path.as_deref().ok_or_else(|| self.missing("path"))?;
        let operation = operations
            .get(&self.name)
            .ok_or_else(|| ConfigurationError::OperationNotFound(self.name.clone()))?;

        let mut endpoint = EndpointDeclaration::new(method, path)
            .name(&self.name)
            .gzip_policy(GzipPolicy::from(self.gzip))
            .with_operation(operation.clone());
        if let Some(output) = &self.output {
            endpoint = endpoint.output(output);
        }
        if let Some(postdata) = &self.postdata {
            endpoint = endpoint.postdata(postdata);
        }
        if let Some(role) = &self.role {
            endpoint = endpoint.role(role);
        }
        if let Some(consumes) = &self.consumes {
            endpoint = endpoint.consumes(consumes);
        }
        if let Some(produces) = &self.produces {
            endpoint = endpoint.produces(produces);
        }
        if let Some(security) = &self.security {
            endpoint = endpoint.security(security);
        }
        Ok(endpoint)
    }

    fn missing(&self, field: &'static str) -> ConfigurationError {
        ConfigurationError::MissingDeclaration {
            endpoint: self.name.clone(),
            field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fault;
    use crate::http::context::RequestContext;

    const SAMPLE: &str = r#"
        [server]
        bind_address = "127.0.0.1:9000"

        [[services]]
        name = "reference"
        root = "/galaga/dectest"
        gzip = true

        [[services.endpoints]]
        name = "getState"
        method = "GET"
        path = "/states/{name:string}"
        output = "String"
        gzip = false
    "#;

    fn get_state(_: &mut RequestContext, name: String) -> Result<String, Fault> {
        Ok(name)
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config: RouterConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:9000");
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(config.services[0].endpoints[0].gzip, Some(false));
    }

    #[test]
    fn test_to_declaration_binds_operation() {
        let config: RouterConfig = toml::from_str(SAMPLE).unwrap();
        let mut operations = OperationTable::new();
        operations.insert("getState", get_state);

        let service = config.services[0].to_declaration(&operations).unwrap();
        assert_eq!(service.endpoints.len(), 1);
        assert_eq!(service.endpoints[0].gzip, GzipPolicy::Off);
        assert!(service.endpoints[0].operation.is_some());
    }

    #[test]
    fn test_to_declaration_errors() {
        let operations = OperationTable::new();
        let endpoint = EndpointConfig {
            name: "getState".into(),
            method: Some("GET".into()),
            path: Some("/states".into()),
            ..Default::default()
        };
        assert_eq!(
            endpoint.to_declaration(&operations).unwrap_err(),
            ConfigurationError::OperationNotFound("getState".into())
        );

        let endpoint = EndpointConfig {
            method: Some("FETCH".into()),
            path: Some("/states".into()),
            ..Default::default()
        };
        assert_eq!(
            endpoint.to_declaration(&operations).unwrap_err(),
            ConfigurationError::UnknownMethod("FETCH".into())
        );

        let endpoint = EndpointConfig {
            method: Some("GET".into()),
            ..Default::default()
        };
        assert!(matches!(
            endpoint.to_declaration(&operations),
            Err(ConfigurationError::MissingDeclaration { field: "path", .. })
        ));
    }
}
