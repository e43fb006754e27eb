//! Ordered argument construction.
//!
//! # Responsibilities
//! - Decode the body for body-carrying methods
//! - Coerce path arguments in declaration order, or every variable-length segment
//! - Coerce query arguments in declaration order, binding zero values for absent ones
//!
//! # Design Decisions
//! - Order is always: body, path, query
//! - The first failure aborts binding; no partial argument list escapes

use std::collections::HashMap;

use thiserror::Error;

use crate::binding::scalar::{CoercionError, Scalar};
use crate::codec::Marshaller;
use crate::endpoint::descriptor::EndpointDescriptor;
use crate::endpoint::types::ParamType;

/// One positional argument ready for an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundArg {
    Payload(serde_json::Value),
    Scalar(Scalar),
    Variadic(Vec<Scalar>),
}

/// Body bytes plus the marshaller chosen to read them.
pub struct BodySource<'a> {
    pub marshaller: &'a dyn Marshaller,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    #[error("Error unmarshalling data using {content_type}")]
    Decode { content_type: String },

    #[error(transparent)]
    Coercion(#[from] CoercionError),

    #[error("Missing value for path parameter [{0}]")]
    MissingPathArg(String),
}

/// Build the argument list for `endpoint`.
///
/// `path_args` is keyed by parameter name, or by `"0"`, `"1"`, .. for a
/// variable-length endpoint.
pub fn bind(
    endpoint: &EndpointDescriptor,
    path_args: &[(String, String)],
    query_args: &HashMap<String, String>,
    body: Option<BodySource<'_>>,
) -> Result<Vec<BoundArg>, BindError> {
    let mut args = Vec::with_capacity(
        usize::from(endpoint.method.takes_body())
            + endpoint.path_params.len()
            + endpoint.query_params.len(),
    );

    // 1. Body
    if endpoint.method.takes_body() {
        let value = match body {
            Some(source) => source
                .marshaller
                .decode(source.bytes, source.content_type)
                .map_err(|_| BindError::Decode {
                    content_type: source.content_type.to_string(),
                })?,
            None => serde_json::Value::Null,
        };
        args.push(BoundArg::Payload(value));
    }

    // 2. Path
    if endpoint.variable_length {
        let param_type = endpoint
            .path_params
            .first()
            .map(|p| p.param_type)
            .unwrap_or(ParamType::String);
        let values = path_args
            .iter()
            .map(|(_, raw)| param_type.coerce(raw))
            .collect::<Result<Vec<_>, _>>()?;
        args.push(BoundArg::Variadic(values));
    } else {
        for param in &endpoint.path_params {
            let raw = path_args
                .iter()
                .find(|(name, _)| name == &param.name)
                .map(|(_, raw)| raw)
                .ok_or_else(|| BindError::MissingPathArg(param.name.clone()))?;
            args.push(BoundArg::Scalar(param.param_type.coerce(raw)?));
        }
    }

    // 3. Query
    for param in &endpoint.query_params {
        let value = match query_args.get(&param.name) {
            Some(raw) => param.param_type.coerce(raw)?,
            None => param.param_type.zero_value(),
        };
        args.push(BoundArg::Scalar(value));
    }

    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonMarshaller;
    use crate::endpoint::descriptor::tests::descriptor;
    use crate::endpoint::types::HttpMethod;

    fn args(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_path_then_query_order_with_zero_values() {
        let endpoint = descriptor(HttpMethod::Get, "x/{a:string}/{b:int}?{q:int32}&{r:bool}");
        let mut query = HashMap::new();
        query.insert("r".to_string(), "true".to_string());

        let bound = bind(&endpoint, &args(&[("a", "Kansas"), ("b", "3")]), &query, None).unwrap();
        assert_eq!(
            bound,
            vec![
                BoundArg::Scalar(Scalar::String("Kansas".into())),
                BoundArg::Scalar(Scalar::Int64(3)),
                BoundArg::Scalar(Scalar::Int32(0)),
                BoundArg::Scalar(Scalar::Bool(true)),
            ]
        );
    }

    #[test]
    fn test_body_comes_first() {
        let endpoint = descriptor(HttpMethod::Post, "x/{id:int}");
        let body = BodySource {
            marshaller: &JsonMarshaller,
            content_type: "application/json",
            bytes: br#"{"Name":"Ohio"}"#,
        };
        let bound = bind(&endpoint, &args(&[("id", "7")]), &HashMap::new(), Some(body)).unwrap();
        assert_eq!(bound[0], BoundArg::Payload(serde_json::json!({"Name": "Ohio"})));
        assert_eq!(bound[1], BoundArg::Scalar(Scalar::Int64(7)));
    }

    #[test]
    fn test_decode_failure_names_content_type() {
        let endpoint = descriptor(HttpMethod::Put, "x");
        let body = BodySource {
            marshaller: &JsonMarshaller,
            content_type: "application/json",
            bytes: b"{broken",
        };
        let err = bind(&endpoint, &[], &HashMap::new(), Some(body)).unwrap_err();
        assert_eq!(err.to_string(), "Error unmarshalling data using application/json");
    }

    #[test]
    fn test_variadic_keeps_positional_order() {
        let endpoint = descriptor(HttpMethod::Get, "files/{...:int32}");
        let bound = bind(
            &endpoint,
            &args(&[("0", "3"), ("1", "1"), ("2", "2")]),
            &HashMap::new(),
            None,
        )
        .unwrap();
        assert_eq!(
            bound,
            vec![BoundArg::Variadic(vec![
                Scalar::Int32(3),
                Scalar::Int32(1),
                Scalar::Int32(2)
            ])]
        );
    }

    #[test]
    fn test_coercion_failure_aborts() {
        let endpoint = descriptor(HttpMethod::Get, "x/{n:int8}");
        let err = bind(&endpoint, &args(&[("n", "999")]), &HashMap::new(), None).unwrap_err();
        assert!(matches!(err, BindError::Coercion(_)));
    }
}
