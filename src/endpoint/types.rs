//! Primitive vocabulary shared by declarations and descriptors.

use std::fmt;
use std::str::FromStr;

use axum::http::{Method, StatusCode};

use crate::error::ConfigurationError;

/// HTTP methods an endpoint may be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// POST and PUT carry a decoded request body as their first argument.
    pub fn takes_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }

    /// Status used when a mutation-shaped operation sets none itself.
    pub fn default_status(&self) -> StatusCode {
        match self {
            HttpMethod::Post => StatusCode::ACCEPTED,
            _ => StatusCode::OK,
        }
    }

    /// Map a transport method; `None` for methods no endpoint can declare.
    pub fn from_http(method: &Method) -> Option<Self> {
        method.as_str().parse().ok()
    }
}

impl FromStr for HttpMethod {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            "PATCH" => Ok(HttpMethod::Patch),
            other => Err(ConfigurationError::UnknownMethod(other.to_string())),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of scalar types path and query parameters may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    String,
    Int8,
    Int16,
    Int32,
    Int64,
    Bool,
    Float32,
    Float64,
}

impl ParamType {
    /// Resolve a declaration tag such as `string` or `int32`.
    /// Tags are case-insensitive; `int` is an alias of `int64`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let ty = match tag.trim().to_ascii_lowercase().as_str() {
            "string" => ParamType::String,
            "int" | "int64" | "i64" => ParamType::Int64,
            "int8" | "i8" => ParamType::Int8,
            "int16" | "i16" => ParamType::Int16,
            "int32" | "i32" => ParamType::Int32,
            "bool" => ParamType::Bool,
            "float32" | "f32" => ParamType::Float32,
            "float64" | "f64" => ParamType::Float64,
            _ => return None,
        };
        Some(ty)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Int8 => "int8",
            ParamType::Int16 => "int16",
            ParamType::Int32 => "int32",
            ParamType::Int64 => "int64",
            ParamType::Bool => "bool",
            ParamType::Float32 => "float32",
            ParamType::Float64 => "float64",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A declared path or query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub param_type: ParamType,
    /// Segment index for path parameters, declaration order for query parameters.
    pub position: usize,
}

/// How an input or output entity is wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeShape {
    Single,
    List,
    /// String-keyed map.
    Map,
}

/// A declared entity type: its name plus list/map wrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,
    pub shape: TypeShape,
}

const LIST_PREFIXES: [&str; 2] = ["alloc::vec::Vec<", "Vec<"];
const MAP_PREFIXES: [&str; 4] = [
    "std::collections::hash::map::HashMap<",
    "alloc::collections::btree::map::BTreeMap<",
    "HashMap<",
    "BTreeMap<",
];

impl TypeDecl {
    pub fn single(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: TypeShape::Single,
        }
    }

    /// Parse a declared type expression.
    ///
    /// Accepts `T`, `Vec<T>`, `[]T`, `HashMap<String, T>`, `BTreeMap<String, T>`
    /// and `map[string]T`. Maps keyed by anything but strings are rejected.
    pub fn parse(
        expr: &str,
        field: &'static str,
        signature: &str,
    ) -> Result<Self, ConfigurationError> {
        let expr = expr.trim();

        if let Some(inner) = expr.strip_prefix("[]") {
            return Ok(Self {
                name: inner.trim().to_string(),
                shape: TypeShape::List,
            });
        }

        if let Some(rest) = expr.strip_prefix("map[") {
            let Some((key, value)) = rest.split_once(']') else {
                return Err(ConfigurationError::NonStringMapKey {
                    field,
                    signature: signature.to_string(),
                });
            };
            if !is_string_key(key) {
                return Err(ConfigurationError::NonStringMapKey {
                    field,
                    signature: signature.to_string(),
                });
            }
            return Ok(Self {
                name: value.trim().to_string(),
                shape: TypeShape::Map,
            });
        }

        match Self::structure(expr) {
            Some(decl) => Ok(decl),
            None => Err(ConfigurationError::NonStringMapKey {
                field,
                signature: signature.to_string(),
            }),
        }
    }

    /// Describe a Rust type the way declarations describe it.
    pub fn of<T: ?Sized + 'static>() -> Self {
        let name = std::any::type_name::<T>();
        // A map with a non-string key can never satisfy a declaration.
        Self::structure(name).unwrap_or_else(|| Self::single(name))
    }

    /// Split a `Vec<..>` / `HashMap<String, ..>` wrapper; `None` for non-string map keys.
    fn structure(expr: &str) -> Option<Self> {
        for prefix in LIST_PREFIXES {
            if let Some(inner) = strip_wrapper(expr, prefix) {
                return Some(Self {
                    name: inner.trim().to_string(),
                    shape: TypeShape::List,
                });
            }
        }

        for prefix in MAP_PREFIXES {
            if let Some(inner) = strip_wrapper(expr, prefix) {
                let args = split_top_level(inner);
                if args.len() < 2 || !is_string_key(args[0]) {
                    return None;
                }
                return Some(Self {
                    name: args[1].trim().to_string(),
                    shape: TypeShape::Map,
                });
            }
        }

        Some(Self::single(expr))
    }

    /// True when `actual` (usually from [`TypeDecl::of`]) satisfies this declaration.
    ///
    /// A declared name containing `::` must match the full type path; otherwise
    /// only the final path segment is compared.
    pub fn accepts(&self, actual: &TypeDecl) -> bool {
        if self.shape != actual.shape {
            return false;
        }
        let declared = if self.name.eq_ignore_ascii_case("string") {
            "String"
        } else {
            self.name.as_str()
        };
        if declared.contains("::") {
            declared == actual.name
        } else {
            declared == short_name(&actual.name)
        }
    }
}

impl fmt::Display for TypeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shape {
            TypeShape::Single => write!(f, "{}", self.name),
            TypeShape::List => write!(f, "Vec<{}>", self.name),
            TypeShape::Map => write!(f, "HashMap<String, {}>", self.name),
        }
    }
}

fn strip_wrapper<'a>(expr: &'a str, prefix: &str) -> Option<&'a str> {
    expr.strip_prefix(prefix)?.strip_suffix('>')
}

fn is_string_key(key: &str) -> bool {
    matches!(
        key.trim(),
        "string" | "String" | "alloc::string::String" | "&str"
    )
}

/// Split generic arguments on commas that are not nested inside `<>`.
fn split_top_level(args: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in args.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&args[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&args[start..]);
    parts
}

/// `alloc::string::String` -> `String`, `app::Page<app::Item>` -> `Page<app::Item>`.
fn short_name(full: &str) -> &str {
    let head_end = full.find('<').unwrap_or(full.len());
    match full[..head_end].rfind("::") {
        Some(i) => &full[i + 2..],
        None => full,
    }
}

/// Per-endpoint compression setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GzipPolicy {
    On,
    Off,
    #[default]
    Inherit,
}

impl GzipPolicy {
    pub fn resolve(self, service_default: bool) -> bool {
        match self {
            GzipPolicy::On => true,
            GzipPolicy::Off => false,
            GzipPolicy::Inherit => service_default,
        }
    }
}

impl From<Option<bool>> for GzipPolicy {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => GzipPolicy::On,
            Some(false) => GzipPolicy::Off,
            None => GzipPolicy::Inherit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct State;

    #[test]
    fn test_method_parsing() {
        assert_eq!("PATCH".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert_eq!(
            "FETCH".parse::<HttpMethod>(),
            Err(ConfigurationError::UnknownMethod("FETCH".into()))
        );
        assert_eq!(HttpMethod::from_http(&Method::TRACE), None);
    }

    #[test]
    fn test_default_status() {
        assert_eq!(HttpMethod::Post.default_status(), StatusCode::ACCEPTED);
        assert_eq!(HttpMethod::Put.default_status(), StatusCode::OK);
        assert_eq!(HttpMethod::Options.default_status(), StatusCode::OK);
    }

    #[test]
    fn test_param_type_tags() {
        assert_eq!(ParamType::from_tag("INT"), Some(ParamType::Int64));
        assert_eq!(ParamType::from_tag("float32"), Some(ParamType::Float32));
        assert_eq!(ParamType::from_tag("uint"), None);
    }

    #[test]
    fn test_type_decl_parse_shapes() {
        let list = TypeDecl::parse("[]State", "output", "s").unwrap();
        assert_eq!(list.shape, TypeShape::List);
        assert_eq!(list.name, "State");

        let map = TypeDecl::parse("HashMap<String, State>", "output", "s").unwrap();
        assert_eq!(map.shape, TypeShape::Map);

        let err = TypeDecl::parse("map[int]State", "postdata", "s").unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::NonStringMapKey {
                field: "postdata",
                signature: "s".into()
            }
        );
    }

    #[test]
    fn test_type_decl_accepts_rust_types() {
        let declared = TypeDecl::parse("State", "output", "s").unwrap();
        assert!(declared.accepts(&TypeDecl::of::<State>()));
        assert!(!declared.accepts(&TypeDecl::of::<Vec<State>>()));

        let declared = TypeDecl::parse("Vec<State>", "output", "s").unwrap();
        assert!(declared.accepts(&TypeDecl::of::<Vec<State>>()));

        let declared = TypeDecl::parse("map[string]State", "output", "s").unwrap();
        assert!(declared.accepts(&TypeDecl::of::<HashMap<String, State>>()));
        assert!(!declared.accepts(&TypeDecl::of::<HashMap<u32, State>>()));

        let declared = TypeDecl::parse("string", "output", "s").unwrap();
        assert!(declared.accepts(&TypeDecl::of::<String>()));
    }

    #[test]
    fn test_gzip_policy_resolution() {
        assert!(GzipPolicy::Inherit.resolve(true));
        assert!(!GzipPolicy::Off.resolve(true));
        assert!(GzipPolicy::On.resolve(false));
    }
}
