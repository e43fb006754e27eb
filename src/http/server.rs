//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with one catch-all handler
//! - Wire up middleware (tracing, request ID, timeout, compression)
//! - Decode the URL and read the body before dispatch
//! - Catch operation faults and panics and answer them with 500
//! - Record per-request metrics
//! - Bind to a listener and stop on the shutdown signal

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Extensions, HeaderMap, Request, StatusCode, Version},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use percent_encoding::percent_decode_str;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    compression::CompressionLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::dispatch::Router as EndpointRouter;
use crate::endpoint::types::HttpMethod;
use crate::error::{DispatchError, RequestError, BAD_REQUEST_MESSAGE, INTERNAL_ERROR_MESSAGE};
use crate::http::context::RequestContext;
use crate::http::request::{request_id, UuidRequestId};
use crate::http::response::Compress;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<EndpointRouter>,
    pub max_body_bytes: usize,
}

/// HTTP transport for an endpoint router.
pub struct HttpServer {
    app: Router,
    config: ServerConfig,
}

impl HttpServer {
    pub fn new(config: ServerConfig, router: Arc<EndpointRouter>) -> Self {
        let state = AppState {
            router,
            max_body_bytes: config.max_body_bytes,
        };
        let app = Self::build_router(&config, state);
        Self { app, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state)
            .layer(CompressionLayer::new().compress_when(marked_for_gzip))
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The fully layered service, for in-process use.
    pub fn app(&self) -> Router {
        self.app.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

fn marked_for_gzip(_: StatusCode, _: Version, _: &HeaderMap, extensions: &Extensions) -> bool {
    extensions.get::<Compress>().is_some()
}

/// Catch-all handler: every request goes through the endpoint router.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request_id(&request);
    let method_label = request.method().to_string();

    let response = serve(&state, request, &request_id).await;

    metrics::record_request(&method_label, response.status().as_u16(), start);
    response
}

async fn serve(state: &AppState, request: Request<Body>, request_id: &str) -> Response {
    let (parts, body) = request.into_parts();

    // 1. Method
    let Some(method) = HttpMethod::from_http(&parts.method) else {
        tracing::warn!(request_id = %request_id, method = %parts.method, "Unsupported method");
        return plain(&RequestError::NotFound);
    };

    // 2. URL
    let path = match percent_decode_str(parts.uri.path()).decode_utf8() {
        Ok(path) => path.into_owned(),
        Err(_) => {
            tracing::warn!(request_id = %request_id, uri = %parts.uri, "Undecodable request path");
            return plain(&RequestError::BadRequest(BAD_REQUEST_MESSAGE.to_string()));
        }
    };
    let url = match parts.uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path,
    };

    // 3. Body
    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to read request body");
            return plain(&RequestError::BadRequest(BAD_REQUEST_MESSAGE.to_string()));
        }
    };

    tracing::debug!(request_id = %request_id, method = %method, url = %url, "Dispatching request");

    // 4. Dispatch, with faults and panics turned into 500
    let mut ctx = RequestContext::new(method, url, parts.headers, body);
    let router = &state.router;
    let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| router.dispatch(&mut ctx)));
    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(DispatchError::Fault(fault))) => {
            tracing::error!(request_id = %request_id, fault = %fault, "Operation failed");
            internal_error(&mut ctx);
        }
        Err(panic) => {
            tracing::error!(
                request_id = %request_id,
                panic = %panic_message(panic.as_ref()),
                "Operation panicked"
            );
            internal_error(&mut ctx);
        }
    }

    // 5. Respond
    match ctx.response_mut().finish() {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Response written twice");
            plain(&RequestError::InternalServerError(INTERNAL_ERROR_MESSAGE.to_string()))
        }
    }
}

fn internal_error(ctx: &mut RequestContext) {
    ctx.response_mut()
        .fail(&RequestError::InternalServerError(INTERNAL_ERROR_MESSAGE.to_string()));
}

fn plain(error: &RequestError) -> Response {
    (error.status(), error.to_string()).into_response()
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        let caught = std::panic::catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(panic_message(caught.as_ref()), "boom");

        let caught = std::panic::catch_unwind(|| panic!("{}", String::from("formatted"))).unwrap_err();
        assert_eq!(panic_message(caught.as_ref()), "formatted");
    }

    #[test]
    fn test_marked_for_gzip() {
        let mut extensions = Extensions::new();
        assert!(!marked_for_gzip(StatusCode::OK, Version::HTTP_11, &HeaderMap::new(), &extensions));
        extensions.insert(Compress);
        assert!(marked_for_gzip(StatusCode::OK, Version::HTTP_11, &HeaderMap::new(), &extensions));
    }
}
