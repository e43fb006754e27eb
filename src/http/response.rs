//! Per-request response state.
//!
//! # Responsibilities
//! - Collect status, message, headers and payload while a request is dispatched
//! - Turn that state into exactly one transport response
//!
//! # Design Decisions
//! - Write-once: `finish` succeeds a single time, later calls are rejected
//! - A message without a payload becomes a `text/plain` body
//! - Compression is requested with a [`Compress`] extension; the transport's
//!   compression layer performs it

use axum::body::{Body, Bytes};
use axum::http::header::{self, HeaderMap, HeaderValue, IntoHeaderName};
use axum::http::StatusCode;
use axum::response::Response;
use thiserror::Error;

use crate::error::RequestError;

/// Response extension asking the transport to gzip the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compress;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("response has already been written")]
pub struct AlreadyWritten;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

#[derive(Debug, Default)]
pub struct ResponseBuilder {
    status: Option<StatusCode>,
    message: Option<String>,
    headers: HeaderMap,
    payload: Option<Bytes>,
    compress: bool,
    written: bool,
}

impl ResponseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, status: StatusCode) -> &mut Self {
        self.status = Some(status);
        self
    }

    /// Status set so far, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn set_message(&mut self, message: impl Into<String>) -> &mut Self {
        self.message = Some(message.into());
        self
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn insert_header<K: IntoHeaderName>(&mut self, name: K, value: HeaderValue) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn set_content_type(&mut self, content_type: &str) -> &mut Self {
        if let Ok(value) = HeaderValue::from_str(content_type) {
            self.headers.insert(header::CONTENT_TYPE, value);
        }
        self
    }

    pub fn set_payload(&mut self, bytes: impl Into<Bytes>, content_type: &str) -> &mut Self {
        self.payload = Some(bytes.into());
        self.set_content_type(content_type)
    }

    pub fn payload(&self) -> Option<&Bytes> {
        self.payload.as_ref()
    }

    pub fn set_compress(&mut self, compress: bool) -> &mut Self {
        self.compress = compress;
        self
    }

    /// Record a request error as status plus message, replacing any payload.
    pub fn fail(&mut self, error: &RequestError) -> &mut Self {
        self.payload = None;
        self.headers.remove(header::CONTENT_TYPE);
        self.set_status(error.status());
        self.set_message(error.to_string())
    }

    /// True once status or message has been chosen by someone.
    pub fn is_set(&self) -> bool {
        self.status.is_some() || self.message.is_some()
    }

    pub fn is_written(&self) -> bool {
        self.written
    }

    /// Produce the transport response. Only the first call succeeds.
    pub fn finish(&mut self) -> Result<Response, AlreadyWritten> {
        if self.written {
            return Err(AlreadyWritten);
        }
        self.written = true;

        let mut headers = std::mem::take(&mut self.headers);
        let body = match (self.payload.take(), self.message.take()) {
            (Some(bytes), _) => Body::from(bytes),
            (None, Some(message)) => {
                headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN));
                Body::from(message)
            }
            (None, None) => Body::empty(),
        };

        let mut response = Response::new(body);
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = headers;
        if self.compress {
            response.extensions_mut().insert(Compress);
        }
        Ok(response)
    }
}
