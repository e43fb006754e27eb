//! Path pattern parsing.
//!
//! # Responsibilities
//! - Normalize a declared pattern (`/states/{name:string}?{page:int}`)
//! - Split it into root, literal segments, path parameters and query parameters
//! - Reject malformed or duplicate parameter declarations
//!
//! # Design Decisions
//! - A parameter always occupies a whole segment: `{name:type}`
//! - `{...:type}` is the unbounded trailing parameter of a variable-length endpoint
//! - Query parameters are declared after `?` as `{name:type}` pieces joined by `&`

use std::collections::BTreeMap;

use crate::endpoint::types::{Param, ParamType};
use crate::error::ConfigurationError;

/// Name that marks the unbounded parameter.
pub const VARIADIC_NAME: &str = "...";

/// The structural breakdown of one declared path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSignature {
    /// Full pattern with leading/trailing slashes trimmed, query declaration included.
    pub signature: String,
    /// Path part of the pattern.
    pub path: String,
    /// Literal prefix of `path` up to the first parameter.
    pub root: String,
    pub literals: BTreeMap<usize, String>,
    pub path_params: Vec<Param>,
    pub query_params: Vec<Param>,
    pub segment_count: usize,
    pub variable_length: bool,
}

impl ParsedSignature {
    pub fn has_path_params(&self) -> bool {
        !self.path_params.is_empty()
    }
}

/// Parse a declared pattern.
pub fn parse_signature(pattern: &str) -> Result<ParsedSignature, ConfigurationError> {
    let signature = pattern.trim_matches('/').to_string();

    let (path, query) = match signature.split_once('?') {
        Some((path, query)) => (path.trim_end_matches('/').to_string(), Some(query)),
        None => (signature.clone(), None),
    };

    let mut path_params: Vec<Param> = Vec::new();
    let mut literals = BTreeMap::new();
    let mut variable_length = false;
    let mut first_param: Option<usize> = None;

    let segments: Vec<&str> = path.split('/').collect();
    for (pos, segment) in segments.iter().enumerate() {
        if is_placeholder(segment) {
            let (name, param_type) = var_type_pair(segment, &signature)?;

            if name == VARIADIC_NAME {
                variable_length = true;
                if pos + 1 != segments.len() {
                    return Err(ConfigurationError::VariableLengthNotTrailing(path.clone()));
                }
            } else if path_params.iter().any(|p| p.name == name) {
                return Err(ConfigurationError::DuplicatePathParam {
                    name,
                    signature: signature.clone(),
                });
            }

            first_param.get_or_insert(pos);
            path_params.push(Param {
                name,
                param_type,
                position: pos,
            });
        } else if segment.contains('{') || segment.contains('}') {
            return Err(ConfigurationError::MalformedSegment {
                segment: segment.to_string(),
                signature: signature.clone(),
            });
        } else {
            literals.insert(pos, segment.to_string());
        }
    }

    if variable_length && path_params.len() > 1 {
        return Err(ConfigurationError::VariableLengthParams(path.clone()));
    }

    let mut query_params: Vec<Param> = Vec::new();
    if let Some(query) = query {
        for (pos, piece) in query.split('&').enumerate() {
            if !is_placeholder(piece) {
                return Err(ConfigurationError::MalformedQuery(signature.clone()));
            }
            let (name, param_type) = var_type_pair(piece, &signature)?;
            let clashes = query_params.iter().any(|p| p.name == name)
                || path_params.iter().any(|p| p.name == name);
            if clashes {
                return Err(ConfigurationError::DuplicateQueryParam {
                    name,
                    signature: signature.clone(),
                });
            }
            query_params.push(Param {
                name,
                param_type,
                position: pos,
            });
        }
    }

    let root = match first_param {
        Some(index) => segments[..index].join("/"),
        None => path.clone(),
    };

    Ok(ParsedSignature {
        signature,
        segment_count: segments.len(),
        path,
        root,
        literals,
        path_params,
        query_params,
        variable_length,
    })
}

fn is_placeholder(piece: &str) -> bool {
    piece.len() >= 2 && piece.starts_with('{') && piece.ends_with('}')
}

/// `{name:type}` -> (name, type).
fn var_type_pair(piece: &str, signature: &str) -> Result<(String, ParamType), ConfigurationError> {
    let inner = &piece[1..piece.len() - 1];
    let Some((name, type_name)) = inner.split_once(':') else {
        return Err(ConfigurationError::MissingParamType {
            param: inner.to_string(),
            signature: signature.to_string(),
        });
    };

    let name = name.trim();
    if name.is_empty() {
        return Err(ConfigurationError::MalformedSegment {
            segment: piece.to_string(),
            signature: signature.to_string(),
        });
    }

    let param_type =
        ParamType::from_tag(type_name).ok_or_else(|| ConfigurationError::UnsupportedParamType {
            type_name: type_name.to_string(),
            signature: signature.to_string(),
        })?;

    Ok((name.to_string(), param_type))
}
