//! Error taxonomy.
//!
//! # Design Decisions
//! - Registration problems are `ConfigurationError` and are returned, never panicked;
//!   the bootstrap decides whether to abort
//! - Per-request problems are `RequestError` and always map to exactly one status
//! - Operation failures are `Fault` and surface at the transport boundary as 500

use axum::http::StatusCode;
use thiserror::Error;

/// Errors detected while registering services and endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Unknown method type:[{0}] in endpoint declaration. Allowed types {{GET,POST,PUT,DELETE,HEAD,OPTIONS,PATCH}}")]
    UnknownMethod(String),

    #[error("Endpoint declaration [{endpoint}] is missing the required '{field}' entry")]
    MissingDeclaration { endpoint: String, field: &'static str },

    #[error("Path segment [{segment}] is not a literal or a {{name:type}} parameter in REST path: {signature}")]
    MalformedSegment { segment: String, signature: String },

    #[error("Please ensure that parameter names({param}) have associated types in REST path: {signature}")]
    MissingParamType { param: String, signature: String },

    #[error("Type {type_name} is not allowed for Path/Query-parameters in REST path: {signature}")]
    UnsupportedParamType { type_name: String, signature: String },

    #[error("Duplicate Path Parameter name({name}) in REST path: {signature}")]
    DuplicatePathParam { name: String, signature: String },

    #[error("Duplicate Query Parameter name({name}) in REST path: {signature}")]
    DuplicateQueryParam { name: String, signature: String },

    #[error("Please check that your Query Parameters are configured correctly for endpoint: {0}")]
    MalformedQuery(String),

    #[error("Variable length endpoints can only have one parameter declaration: {0}")]
    VariableLengthParams(String),

    #[error("Variable length parameter must be the last path segment: {0}")]
    VariableLengthNotTrailing(String),

    #[error("Endpoint already registered: {method} {signature}")]
    DuplicateSignature { method: String, signature: String },

    #[error("Can not register two endpoints with same request-method({method}) and same signature: {signature} VS {existing}")]
    DuplicateStructure {
        method: String,
        signature: String,
        existing: String,
    },

    #[error("Endpoints with request-method({method}) could both match the same path: {signature} VS {existing}")]
    AmbiguousSignature {
        method: String,
        signature: String,
        existing: String,
    },

    #[error("Variable length endpoints can only be mounted on a unique root. Root already used: {existing} <> {root}")]
    AmbiguousVariableRoot { root: String, existing: String },

    #[error("Only string keyed maps are allowed on the [{field}] declaration. Endpoint: {signature}")]
    NonStringMapKey { field: &'static str, signature: String },

    #[error("The Marshaller for mime-type:[{0}], is not registered. Please register this type before registering your service.")]
    UnknownContentType(String),

    #[error("The realm:[{0}], is not registered. Please register this realm before registering your service.")]
    UnknownRealm(String),

    #[error("No matching operation for endpoint [{endpoint}]. Expecting {expected}, found {found}")]
    OperationMismatch {
        endpoint: String,
        expected: String,
        found: String,
    },

    #[error("No operation registered under the name [{0}]")]
    OperationNotFound(String),

    #[error("Service [{0}] is already registered")]
    DuplicateService(String),
}

/// Errors that end a single request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("The resource in the requested path could not be found.")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    InternalServerError(String),
}

impl RequestError {
    /// Status code sent to the client for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::NotFound => StatusCode::NOT_FOUND,
            RequestError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RequestError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Body sent with a 400 for URLs that cannot be decoded.
pub const BAD_REQUEST_MESSAGE: &str = "Client sent bad request.";

/// Body sent with a 500 for faults and panics.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error.";

/// Failure raised by an operation while it runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct Fault(pub String);

impl Fault {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Failures the dispatcher hands back to the transport boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("operation fault: {0}")]
    Fault(#[from] Fault),
}

/// Marshalling failures.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("decode failed for {content_type}: {reason}")]
    Decode { content_type: String, reason: String },

    #[error("encode failed for {content_type}: {reason}")]
    Encode { content_type: String, reason: String },

    #[error("no marshaller registered for {0}")]
    Unregistered(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_error_status() {
        assert_eq!(RequestError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            RequestError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RequestError::InternalServerError("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_configuration_error_message_names_signature() {
        let err = ConfigurationError::DuplicateStructure {
            method: "GET".into(),
            signature: "a/{y:string}".into(),
            existing: "a/{x:string}".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("a/{y:string}"));
        assert!(msg.contains("a/{x:string}"));
    }
}
