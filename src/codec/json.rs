//! JSON marshaller.

use serde_json::Value;

use crate::codec::Marshaller;
use crate::error::CodecError;

/// Serves every `*json*` content type with `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMarshaller;

impl Marshaller for JsonMarshaller {
    fn decode(&self, bytes: &[u8], content_type: &str) -> Result<Value, CodecError> {
        // An empty body decodes to null so optional payloads bind cleanly.
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode {
            content_type: content_type.to_string(),
            reason: e.to_string(),
        })
    }

    fn encode(&self, value: &Value, content_type: &str) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(value).map_err(|e| CodecError::Encode {
            content_type: content_type.to_string(),
            reason: e.to_string(),
        })
    }
}
