//! Per-request context handed to authorizers and operations.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::http::header::{self, HeaderMap};

use crate::endpoint::types::HttpMethod;
use crate::http::response::ResponseBuilder;

const BEARER: &str = "Bearer";

/// Transient state of one request. Owned by the task serving it.
#[derive(Debug)]
pub struct RequestContext {
    method: HttpMethod,
    url: String,
    headers: HeaderMap,
    body: Bytes,
    path_args: Vec<(String, String)>,
    query_args: HashMap<String, String>,
    token: Option<String>,
    consumes: Option<String>,
    produces: Option<String>,
    response: ResponseBuilder,
}

impl RequestContext {
    /// `url` is the decoded path with the raw query string still attached.
    pub fn new(method: HttpMethod, url: impl Into<String>, headers: HeaderMap, body: Bytes) -> Self {
        let mut response = ResponseBuilder::new();
        let mut token = None;

        // A bearer Authorization header supplies the token and is echoed back.
        if let Some(value) = headers.get(header::AUTHORIZATION) {
            if let Ok(text) = value.to_str() {
                if text.contains(BEARER) {
                    token = Some(text.replacen(BEARER, "", 1).trim().to_string());
                    response.insert_header(header::AUTHORIZATION, value.clone());
                }
            }
        }

        Self {
            method,
            url: url.into(),
            headers,
            body,
            path_args: Vec::new(),
            query_args: HashMap::new(),
            token,
            consumes: None,
            produces: None,
            response,
        }
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Path part of the URL.
    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or_default()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn path_arg(&self, name: &str) -> Option<&str> {
        self.path_args
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn path_args(&self) -> &[(String, String)] {
        &self.path_args
    }

    pub fn query_arg(&self, name: &str) -> Option<&str> {
        self.query_args.get(name).map(String::as_str)
    }

    pub fn query_args(&self) -> &HashMap<String, String> {
        &self.query_args
    }

    /// Security token from the bearer header, else from the reserved query parameter.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Negotiated request content type, once resolved.
    pub fn consumes(&self) -> Option<&str> {
        self.consumes.as_deref()
    }

    /// Negotiated response content type, once resolved.
    pub fn produces(&self) -> Option<&str> {
        self.produces.as_deref()
    }

    pub fn response(&self) -> &ResponseBuilder {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut ResponseBuilder {
        &mut self.response
    }

    pub(crate) fn set_route(
        &mut self,
        path_args: Vec<(String, String)>,
        query_args: HashMap<String, String>,
        query_token: Option<String>,
    ) {
        self.path_args = path_args;
        self.query_args = query_args;
        if self.token.is_none() {
            self.token = query_token;
        }
    }

    pub(crate) fn set_consumes(&mut self, content_type: String) {
        self.consumes = Some(content_type);
    }

    pub(crate) fn set_produces(&mut self, content_type: String) {
        self.produces = Some(content_type);
    }
}
