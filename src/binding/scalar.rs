//! Scalar coercion for path and query tokens.
//!
//! Each declared [`ParamType`] selects exactly one parse function; there is no
//! open-ended conversion.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::endpoint::types::ParamType;

/// A coerced path or query value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Bool(bool),
    Float32(f32),
    Float64(f64),
}

impl Scalar {
    pub fn param_type(&self) -> ParamType {
        match self {
            Scalar::String(_) => ParamType::String,
            Scalar::Int8(_) => ParamType::Int8,
            Scalar::Int16(_) => ParamType::Int16,
            Scalar::Int32(_) => ParamType::Int32,
            Scalar::Int64(_) => ParamType::Int64,
            Scalar::Bool(_) => ParamType::Bool,
            Scalar::Float32(_) => ParamType::Float32,
            Scalar::Float64(_) => ParamType::Float64,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(v) => f.write_str(v),
            Scalar::Int8(v) => write!(f, "{v}"),
            Scalar::Int16(v) => write!(f, "{v}"),
            Scalar::Int32(v) => write!(f, "{v}"),
            Scalar::Int64(v) => write!(f, "{v}"),
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::Float32(v) => write!(f, "{v}"),
            Scalar::Float64(v) => write!(f, "{v}"),
        }
    }
}

/// A token that does not parse as its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid value [{token}] for {param_type} parameter")]
pub struct CoercionError {
    pub token: String,
    pub param_type: ParamType,
}

impl ParamType {
    /// Parse a raw token into this type.
    pub fn coerce(&self, token: &str) -> Result<Scalar, CoercionError> {
        let scalar = match self {
            ParamType::String => Scalar::String(token.to_string()),
            ParamType::Int8 => Scalar::Int8(self.parse_token(token)?),
            ParamType::Int16 => Scalar::Int16(self.parse_token(token)?),
            ParamType::Int32 => Scalar::Int32(self.parse_token(token)?),
            ParamType::Int64 => Scalar::Int64(self.parse_token(token)?),
            ParamType::Bool => Scalar::Bool(self.parse_token(token)?),
            ParamType::Float32 => Scalar::Float32(self.parse_token(token)?),
            ParamType::Float64 => Scalar::Float64(self.parse_token(token)?),
        };
        Ok(scalar)
    }

    /// Value bound when an optional argument is absent.
    pub fn zero_value(&self) -> Scalar {
        match self {
            ParamType::String => Scalar::String(String::new()),
            ParamType::Int8 => Scalar::Int8(0),
            ParamType::Int16 => Scalar::Int16(0),
            ParamType::Int32 => Scalar::Int32(0),
            ParamType::Int64 => Scalar::Int64(0),
            ParamType::Bool => Scalar::Bool(false),
            ParamType::Float32 => Scalar::Float32(0.0),
            ParamType::Float64 => Scalar::Float64(0.0),
        }
    }

    fn parse_token<T: FromStr>(&self, token: &str) -> Result<T, CoercionError> {
        token.trim().parse().map_err(|_| CoercionError {
            token: token.to_string(),
            param_type: *self,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_round_trip() {
        let cases = [
            (ParamType::String, "Kansas"),
            (ParamType::Int8, "-12"),
            (ParamType::Int16, "30000"),
            (ParamType::Int32, "42"),
            (ParamType::Int64, "-9000000000"),
            (ParamType::Bool, "true"),
            (ParamType::Float32, "1.5"),
            (ParamType::Float64, "-0.25"),
        ];
        for (ty, token) in cases {
            let value = ty.coerce(token).unwrap();
            assert_eq!(value.param_type(), ty);
            assert_eq!(value.to_string(), token, "round trip for {ty}");
        }
    }

    #[test]
    fn test_coercion_failure() {
        let err = ParamType::Int8.coerce("300").unwrap_err();
        assert_eq!(err.param_type, ParamType::Int8);
        assert!(ParamType::Bool.coerce("yes").is_err());
        assert!(ParamType::Float64.coerce("").is_err());
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(ParamType::String.zero_value(), Scalar::String(String::new()));
        assert_eq!(ParamType::Int32.zero_value(), Scalar::Int32(0));
        assert_eq!(ParamType::Bool.zero_value(), Scalar::Bool(false));
    }
}
