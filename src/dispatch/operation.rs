//! Statically typed operation adapters.
//!
//! # Responsibilities
//! - Wrap plain Rust functions `fn(&mut RequestContext, A1, .., An) -> Result<R, Fault>`
//!   behind one erased calling convention `(context, ordered args) -> result`
//! - Describe each function's argument kinds and return type so registration
//!   can compare them with the endpoint declaration
//!
//! # Design Decisions
//! - Argument kinds come from the Rust types: [`Payload<T>`] is the decoded body,
//!   scalars are path/query values, `Vec<scalar>` is the variable-length tail
//! - A `()` return marks a mutation-shaped operation
//! - Conversion of every argument happens before the function runs, so a bad
//!   argument never results in a partial call

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::binding::{BoundArg, Scalar};
use crate::endpoint::types::{ParamType, TypeDecl};
use crate::error::Fault;
use crate::http::context::RequestContext;

/// Why an invocation did not produce a value.
#[derive(Debug, Clone, PartialEq)]
pub enum InvokeError {
    /// An argument could not be converted to the operation's Rust type.
    Bind(String),
    /// The returned value could not be turned into an entity.
    Encode(String),
    /// The operation itself failed.
    Fault(Fault),
}

/// What an operation expects at one argument position.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgKind {
    Payload(TypeDecl),
    Scalar(ParamType),
    Variadic(ParamType),
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgKind::Payload(decl) => write!(f, "Payload<{decl}>"),
            ArgKind::Scalar(ty) => write!(f, "{ty}"),
            ArgKind::Variadic(ty) => write!(f, "...{ty}"),
        }
    }
}

/// Argument kinds and return type of an operation, in call order.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationSignature {
    pub args: Vec<ArgKind>,
    pub returns: Option<TypeDecl>,
}

impl OperationSignature {
    /// True when `actual` can serve a declaration that implies `self`.
    pub fn accepts(&self, actual: &OperationSignature) -> bool {
        if self.args.len() != actual.args.len() {
            return false;
        }
        let args_match = self.args.iter().zip(&actual.args).all(|pair| match pair {
            (ArgKind::Payload(declared), ArgKind::Payload(found)) => declared.accepts(found),
            (declared, found) => declared == found,
        });
        let returns_match = match (&self.returns, &actual.returns) {
            (None, None) => true,
            (Some(declared), Some(found)) => declared.accepts(found),
            _ => false,
        };
        args_match && returns_match
    }
}

impl fmt::Display for OperationSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("fn(")?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        match &self.returns {
            Some(decl) => write!(f, ") -> {decl}"),
            None => f.write_str(")"),
        }
    }
}

/// Decoded request body handed to an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload<T>(pub T);

impl<T> Payload<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

/// Conversion from a bound argument into an operation parameter.
pub trait FromArg: Sized + 'static {
    fn kind() -> ArgKind;

    fn from_arg(arg: BoundArg) -> Result<Self, InvokeError>;
}

impl<T> FromArg for Payload<T>
where
    T: DeserializeOwned + 'static,
{
    fn kind() -> ArgKind {
        ArgKind::Payload(TypeDecl::of::<T>())
    }

    fn from_arg(arg: BoundArg) -> Result<Self, InvokeError> {
        match arg {
            BoundArg::Payload(value) => serde_json::from_value(value)
                .map(Payload)
                .map_err(|e| InvokeError::Bind(e.to_string())),
            other => Err(unexpected(&other, "payload")),
        }
    }
}

macro_rules! scalar_arg {
    ($($rust:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromArg for $rust {
                fn kind() -> ArgKind {
                    ArgKind::Scalar(ParamType::$variant)
                }

                fn from_arg(arg: BoundArg) -> Result<Self, InvokeError> {
                    match arg {
                        BoundArg::Scalar(Scalar::$variant(value)) => Ok(value),
                        other => Err(unexpected(&other, ParamType::$variant.name())),
                    }
                }
            }

            impl FromArg for Vec<$rust> {
                fn kind() -> ArgKind {
                    ArgKind::Variadic(ParamType::$variant)
                }

                fn from_arg(arg: BoundArg) -> Result<Self, InvokeError> {
                    match arg {
                        BoundArg::Variadic(values) => values
                            .into_iter()
                            .map(|value| match value {
                                Scalar::$variant(value) => Ok(value),
                                other => Err(InvokeError::Bind(format!(
                                    "expected {} element, got {}",
                                    ParamType::$variant,
                                    other.param_type()
                                ))),
                            })
                            .collect(),
                        other => Err(unexpected(&other, "variadic")),
                    }
                }
            }
        )*
    };
}

scalar_arg! {
    String => String,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    bool => Bool,
    f32 => Float32,
    f64 => Float64,
}

fn unexpected(arg: &BoundArg, wanted: &str) -> InvokeError {
    InvokeError::Bind(format!("expected {wanted} argument, got {arg:?}"))
}

/// Erased calling convention shared by all operations.
pub type OperationResult = Result<Option<Value>, InvokeError>;

/// A Rust function usable as an endpoint operation. `Args` is the tuple of
/// parameter types after the context and only exists to keep impls apart.
pub trait Handler<Args>: Send + Sync + 'static {
    fn signature() -> OperationSignature;

    fn call(&self, ctx: &mut RequestContext, args: Vec<BoundArg>) -> OperationResult;
}

fn returns_of<R: 'static>() -> Option<TypeDecl> {
    if TypeId::of::<R>() == TypeId::of::<()>() {
        None
    } else {
        Some(TypeDecl::of::<R>())
    }
}

fn into_entity<R: Serialize + 'static>(value: R) -> OperationResult {
    if TypeId::of::<R>() == TypeId::of::<()>() {
        return Ok(None);
    }
    serde_json::to_value(value)
        .map(Some)
        .map_err(|e| InvokeError::Encode(e.to_string()))
}

macro_rules! impl_handler {
    ($($ty:ident $arg:ident),*) => {
        impl<F, R, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: Fn(&mut RequestContext, $($ty,)*) -> Result<R, Fault> + Send + Sync + 'static,
            R: Serialize + 'static,
            $($ty: FromArg,)*
        {
            fn signature() -> OperationSignature {
                OperationSignature {
                    args: vec![$(<$ty as FromArg>::kind(),)*],
                    returns: returns_of::<R>(),
                }
            }

            #[allow(unused_mut, unused_variables)]
            fn call(&self, ctx: &mut RequestContext, args: Vec<BoundArg>) -> OperationResult {
                let mut args = args.into_iter();
                $(
                    let $arg = match args.next() {
                        Some(arg) => <$ty as FromArg>::from_arg(arg)?,
                        None => return Err(InvokeError::Bind("missing argument".to_string())),
                    };
                )*
                let value = (self)(ctx, $($arg,)*).map_err(InvokeError::Fault)?;
                into_entity(value)
            }
        }
    };
}

impl_handler!();
impl_handler!(A1 a1);
impl_handler!(A1 a1, A2 a2);
impl_handler!(A1 a1, A2 a2, A3 a3);
impl_handler!(A1 a1, A2 a2, A3 a3, A4 a4);
impl_handler!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_handler!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
impl_handler!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7);
impl_handler!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8);

type ErasedCall = dyn Fn(&mut RequestContext, Vec<BoundArg>) -> OperationResult + Send + Sync;

/// A registered operation: the erased call plus its signature.
#[derive(Clone)]
pub struct Operation {
    signature: OperationSignature,
    call: Arc<ErasedCall>,
}

impl Operation {
    pub fn new<H, Args>(handler: H) -> Self
    where
        H: Handler<Args>,
    {
        Self {
            signature: H::signature(),
            call: Arc::new(move |ctx: &mut RequestContext, args: Vec<BoundArg>| {
                handler.call(ctx, args)
            }),
        }
    }

    pub fn signature(&self) -> &OperationSignature {
        &self.signature
    }

    pub fn invoke(&self, ctx: &mut RequestContext, args: Vec<BoundArg>) -> OperationResult {
        (self.call)(ctx, args)
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("signature", &self.signature.to_string())
            .finish()
    }
}

/// Operations addressed by endpoint name, for declarations that come from
/// configuration rather than code.
#[derive(Debug, Clone, Default)]
pub struct OperationTable {
    operations: HashMap<String, Operation>,
}

impl OperationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<H, Args>(&mut self, name: impl Into<String>, handler: H) -> &mut Self
    where
        H: Handler<Args>,
    {
        self.operations.insert(name.into(), Operation::new(handler));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Operation> {
        self.operations.get(name)
    }
}
