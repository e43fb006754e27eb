//! Content type negotiation.

use axum::http::header::{HeaderMap, ACCEPT, ACCEPT_ENCODING, CONTENT_TYPE};

use crate::codec::{essence, APPLICATION_JSON};
use crate::endpoint::descriptor::{EndpointDescriptor, ServiceDescriptor};

/// Content type used to decode the request body: the endpoint override, else
/// the request `Content-Type` when the service consumes it, else the
/// service's first consumed type.
pub fn consumed_type(
    endpoint: &EndpointDescriptor,
    service: &ServiceDescriptor,
    headers: &HeaderMap,
) -> String {
    if let Some(content_type) = &endpoint.consumes {
        return content_type.clone();
    }
    let requested = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(essence);
    if let Some(requested) = requested {
        if let Some(found) = service.consumes.iter().find(|c| essence(c) == requested) {
            return found.clone();
        }
    }
    first_or_json(&service.consumes)
}

/// Content type used to encode the response: the endpoint override, else the
/// first produced type listed in `Accept`, else the service's first produced type.
pub fn produced_type(
    endpoint: &EndpointDescriptor,
    service: &ServiceDescriptor,
    headers: &HeaderMap,
) -> String {
    if let Some(content_type) = &endpoint.produces {
        return content_type.clone();
    }
    let accepted: Vec<String> = headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(essence)
        .collect();
    service
        .produces
        .iter()
        .find(|p| accepted.contains(&essence(p)))
        .cloned()
        .unwrap_or_else(|| first_or_json(&service.produces))
}

/// True when the client advertises gzip support.
///
/// Codings are read with their `q` weights: `gzip;q=0` refuses gzip, and `*`
/// stands for gzip only when gzip is not listed itself.
pub fn accepts_gzip(headers: &HeaderMap) -> bool {
    let mut gzip = None;
    let mut wildcard = None;
    for (coding, weight) in headers
        .get_all(ACCEPT_ENCODING)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(coding_weight)
    {
        match coding.as_str() {
            "gzip" | "x-gzip" => gzip = Some(weight > 0.0),
            "*" => wildcard = Some(weight > 0.0),
            _ => {}
        }
    }
    gzip.or(wildcard).unwrap_or(false)
}

/// Split `gzip;q=0.5` into the lowercased coding and its weight (1 when absent).
fn coding_weight(piece: &str) -> Option<(String, f32)> {
    let mut parts = piece.split(';');
    let coding = parts.next()?.trim().to_ascii_lowercase();
    if coding.is_empty() {
        return None;
    }
    let weight = parts
        .filter_map(|param| param.trim().split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("q"))
        .map(|(_, value)| value.trim().parse::<f32>().unwrap_or(0.0))
        .unwrap_or(1.0);
    Some((coding, weight))
}

fn first_or_json(types: &[String]) -> String {
    types
        .first()
        .cloned()
        .unwrap_or_else(|| APPLICATION_JSON.to_string())
}
