//! Request path matching.
//!
//! # Responsibilities
//! - Resolve (method, decoded URL) to exactly one endpoint descriptor
//! - Extract raw path arguments and query arguments
//! - Pull the out-of-band security token from the query string
//!
//! # Design Decisions
//! - Exact lookup first, structural scan second
//! - Literal segments are compared case-sensitively, whole segment at a time
//! - Arguments stay strings here; typing happens in the binder

use std::collections::HashMap;

use percent_encoding::percent_decode_str;

use crate::endpoint::descriptor::EndpointDescriptor;
use crate::endpoint::types::HttpMethod;
use crate::routing::registry::Registry;

/// Reserved query parameter carrying a security token.
pub const TOKEN_PARAM: &str = "xsrft";

/// A resolved endpoint plus the raw arguments taken from the URL.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub endpoint: &'a EndpointDescriptor,
    /// Declared parameter name -> value, or `"0"`, `"1"`, .. for variable-length matches.
    pub path_args: Vec<(String, String)>,
    pub query_args: HashMap<String, String>,
    pub token: Option<String>,
}

/// Resolve `url` (path plus optional `?query`) for `method`.
pub fn resolve<'a>(registry: &'a Registry, method: HttpMethod, url: &str) -> Option<RouteMatch<'a>> {
    // 1. Split query
    let (path, query) = match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    };
    let path = path.trim_matches('/');

    // 2. Exact, then structural
    let segments: Vec<&str> = path.split('/').collect();
    let endpoint = registry
        .exact_lookup(method, path)
        .or_else(|| registry.fallback_lookup(method, |e| structurally_matches(e, path, &segments)))?;

    // 3. Arguments
    let path_args = if endpoint.variable_length {
        variadic_args(&endpoint.root, path)
    } else {
        endpoint
            .path_params
            .iter()
            .filter_map(|param| {
                segments
                    .get(param.position)
                    .map(|raw| (param.name.clone(), raw.trim().to_string()))
            })
            .collect()
    };
    let (query_args, token) = parse_query(query.unwrap_or_default());

    Some(RouteMatch {
        endpoint,
        path_args,
        query_args,
        token,
    })
}

fn structurally_matches(endpoint: &EndpointDescriptor, path: &str, segments: &[&str]) -> bool {
    if !root_matches(&endpoint.root, path) {
        return false;
    }
    if endpoint.variable_length {
        return true;
    }
    segments.len() == endpoint.segment_count
        && endpoint
            .non_parameter_segments
            .iter()
            .all(|(&index, literal)| segments.get(index) == Some(&literal.as_str()))
}

fn root_matches(root: &str, path: &str) -> bool {
    root.is_empty() || path == root || path.starts_with(&format!("{root}/"))
}

/// Every segment after `root`, in order. A path equal to the root yields none.
fn variadic_args(root: &str, path: &str) -> Vec<(String, String)> {
    let rest = path[root.len()..].trim_matches('/');
    if rest.is_empty() {
        return Vec::new();
    }
    rest.split('/')
        .enumerate()
        .map(|(i, raw)| (i.to_string(), raw.trim().to_string()))
        .collect()
}

/// Split `a=1&b=2` into a map, taking out the security token.
pub fn parse_query(query: &str) -> (HashMap<String, String>, Option<String>) {
    let mut args = HashMap::new();
    let mut token = None;

    for piece in query.split('&').filter(|p| !p.is_empty()) {
        let (name, value) = piece.split_once('=').unwrap_or((piece, ""));
        let name = decode_component(name.trim());
        let value = decode_component(value.trim());
        if name == TOKEN_PARAM {
            token = Some(value);
        } else {
            args.insert(name, value);
        }
    }

    (args, token)
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::descriptor::tests::descriptor;

    fn registry(patterns: &[&str]) -> Registry {
        let mut registry = Registry::new();
        for pattern in patterns {
            registry.add_endpoint(descriptor(HttpMethod::Get, pattern)).unwrap();
        }
        registry
    }

    #[test]
    fn test_fixed_match_extracts_in_declared_order() {
        let registry = registry(&["x/{a:string}/{b:int}"]);
        let matched = resolve(&registry, HttpMethod::Get, "/x/hi/42").unwrap();
        assert_eq!(
            matched.path_args,
            vec![("a".to_string(), "hi".to_string()), ("b".to_string(), "42".to_string())]
        );
        assert!(resolve(&registry, HttpMethod::Get, "/x/hi").is_none());
        assert!(resolve(&registry, HttpMethod::Post, "/x/hi/42").is_none());
    }

    #[test]
    fn test_literal_mismatch_eliminates() {
        let registry = registry(&["string/{name:string}/{test:string}/multiple"]);
        assert!(resolve(&registry, HttpMethod::Get, "/string/a/b/multiple").is_some());
        assert!(resolve(&registry, HttpMethod::Get, "/string/a/b/single").is_none());
    }

    #[test]
    fn test_variadic_positional_order() {
        let registry = registry(&["files/{...:string}"]);
        let matched = resolve(&registry, HttpMethod::Get, "/files/a/b/c").unwrap();
        let values: Vec<_> = matched.path_args.iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(values, ["a", "b", "c"]);
        assert_eq!(matched.path_args[2].0, "2");

        let matched = resolve(&registry, HttpMethod::Get, "/files").unwrap();
        assert!(matched.path_args.is_empty());

        assert!(resolve(&registry, HttpMethod::Get, "/filesystem/a").is_none());
    }

    #[test]
    fn test_exact_match_with_query() {
        let registry = registry(&["lookup?{name:string}&{page:int}"]);
        let matched = resolve(&registry, HttpMethod::Get, "/lookup?name=Kansas&xsrft=abc&extra=1").unwrap();
        assert_eq!(matched.query_args.get("name").map(String::as_str), Some("Kansas"));
        assert_eq!(matched.query_args.get("extra").map(String::as_str), Some("1"));
        assert!(!matched.query_args.contains_key(TOKEN_PARAM));
        assert_eq!(matched.token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_parse_query_decoding() {
        let (args, token) = parse_query("q=New+York&city=San%20Jose& flag &=x");
        assert_eq!(args.get("q").map(String::as_str), Some("New York"));
        assert_eq!(args.get("city").map(String::as_str), Some("San Jose"));
        assert_eq!(args.get("flag").map(String::as_str), Some(""));
        assert!(token.is_none());
    }

    #[test]
    fn test_leading_parameter_matches_by_shape() {
        let registry = registry(&["{x:string}/b"]);
        let matched = resolve(&registry, HttpMethod::Get, "/zzz/b").unwrap();
        assert_eq!(matched.path_args, vec![("x".to_string(), "zzz".to_string())]);
        assert!(resolve(&registry, HttpMethod::Get, "/zzz/c").is_none());
        assert!(resolve(&registry, HttpMethod::Get, "/zzz/b/c").is_none());
    }

    #[test]
    fn test_resolution_independent_of_registration_order() {
        let forward = registry(&["a", "a/b", "c/{x:string}"]);
        let backward = registry(&["c/{x:string}", "a/b", "a"]);
        for url in ["/a", "/a/b", "/c/z"] {
            let one = resolve(&forward, HttpMethod::Get, url).unwrap();
            let two = resolve(&backward, HttpMethod::Get, url).unwrap();
            assert_eq!(one.endpoint.signature, two.endpoint.signature);
        }
    }
}
