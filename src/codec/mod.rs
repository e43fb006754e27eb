//! Marshalling between request/response bytes and entity values.
//!
//! # Responsibilities
//! - Define the [`Marshaller`] contract the dispatcher calls
//! - Keep the content-type keyed marshaller table
//! - Supply the built-in JSON family
//!
//! # Design Decisions
//! - Entities travel through the dispatcher as `serde_json::Value`; typed
//!   operations convert at their own boundary
//! - Content types are compared on their essence (`type/subtype`, lowercase),
//!   parameters such as `charset` are ignored
//! - Any content type naming `json` is served by [`JsonMarshaller`] without
//!   explicit registration

mod json;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::CodecError;

pub use json::JsonMarshaller;

/// Default content type for services and endpoints that declare none.
pub const APPLICATION_JSON: &str = "application/json";

/// Codec for one or more content types.
pub trait Marshaller: Send + Sync {
    fn decode(&self, bytes: &[u8], content_type: &str) -> Result<Value, CodecError>;

    fn encode(&self, value: &Value, content_type: &str) -> Result<Vec<u8>, CodecError>;
}

/// Content-type keyed marshaller table.
#[derive(Clone, Default)]
pub struct Marshallers {
    table: HashMap<String, Arc<dyn Marshaller>>,
}

impl Marshallers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, content_type: &str, marshaller: Arc<dyn Marshaller>) {
        self.table.insert(essence(content_type), marshaller);
    }

    pub fn get(&self, content_type: &str) -> Option<&Arc<dyn Marshaller>> {
        self.table.get(&essence(content_type))
    }

    /// Make sure `content_type` can be served, registering a known codec
    /// family when possible. Returns false when nothing can serve it.
    pub fn ensure(&mut self, content_type: &str) -> bool {
        if self.get(content_type).is_some() {
            return true;
        }
        if essence(content_type).contains("json") {
            tracing::debug!(content_type, "Registering JSON marshaller");
            self.register(content_type, Arc::new(JsonMarshaller));
            return true;
        }
        false
    }
}

impl std::fmt::Debug for Marshallers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.table.keys()).finish()
    }
}

/// `Application/JSON; charset=utf-8` -> `application/json`.
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_family_auto_registration() {
        let mut marshallers = Marshallers::new();
        assert!(marshallers.get("application/hal+json").is_none());
        assert!(marshallers.ensure("application/hal+json"));
        assert!(marshallers.get("application/hal+json; charset=utf-8").is_some());
        assert!(!marshallers.ensure("application/xml"));
    }

    #[test]
    fn test_explicit_registration_wins() {
        struct Fixed;
        impl Marshaller for Fixed {
            fn decode(&self, _: &[u8], _: &str) -> Result<Value, CodecError> {
                Ok(Value::Null)
            }
            fn encode(&self, _: &Value, _: &str) -> Result<Vec<u8>, CodecError> {
                Ok(b"fixed".to_vec())
            }
        }

        let mut marshallers = Marshallers::new();
        marshallers.register("text/csv", Arc::new(Fixed));
        assert!(marshallers.ensure("text/csv"));
        let out = marshallers
            .get("TEXT/CSV")
            .unwrap()
            .encode(&Value::Null, "text/csv")
            .unwrap();
        assert_eq!(out, b"fixed");
    }
}
