//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use serde::{Deserialize, Serialize};
use tower::ServiceExt;

use endpoint_router::config::ServerConfig;
use endpoint_router::hypermedia::{EntityMetadata, SirenDecorator, SIREN_JSON};
use endpoint_router::{
    EndpointDeclaration, Fault, HttpMethod, HttpServer, Payload, RequestContext, ResponseBuilder,
    Router, ServiceDeclaration,
};

pub static SECURE_CALLS: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct State {
    pub name: String,
    pub value: String,
}

pub fn get_state(_: &mut RequestContext, name: String) -> Result<State, Fault> {
    Ok(State {
        name,
        value: "found".to_string(),
    })
}

pub fn get_pair(_: &mut RequestContext, a: String, b: i64) -> Result<String, Fault> {
    Ok(format!("{a}:{b}"))
}

pub fn lookup(_: &mut RequestContext, name: String, page: i32, exact: bool) -> Result<String, Fault> {
    Ok(format!("{name}|{page}|{exact}"))
}

pub fn add_state(_: &mut RequestContext, state: Payload<State>) -> Result<(), Fault> {
    if state.0.name.is_empty() {
        return Err(Fault::new("state without a name"));
    }
    Ok(())
}

pub fn update_state(ctx: &mut RequestContext, state: Payload<State>, id: i64) -> Result<(), Fault> {
    ctx.response_mut()
        .set_status(StatusCode::CREATED)
        .set_message(format!("{} stored as {id}", state.0.name));
    Ok(())
}

pub fn remove_state(_: &mut RequestContext, _id: i64) -> Result<(), Fault> {
    Ok(())
}

pub fn touch_state(_: &mut RequestContext, _state: Payload<State>, _id: i64) -> Result<(), Fault> {
    Ok(())
}

pub fn check_state(_: &mut RequestContext, _name: String) -> Result<(), Fault> {
    Ok(())
}

pub fn state_options(ctx: &mut RequestContext) -> Result<(), Fault> {
    ctx.response_mut().insert_header(
        axum::http::header::ALLOW,
        axum::http::HeaderValue::from_static("GET, HEAD, POST, PUT, DELETE, OPTIONS"),
    );
    Ok(())
}

pub fn list_files(_: &mut RequestContext, parts: Vec<String>) -> Result<Vec<String>, Fault> {
    Ok(parts)
}

pub fn explode(_: &mut RequestContext) -> Result<String, Fault> {
    panic!("operation blew up")
}

pub fn broken(_: &mut RequestContext) -> Result<String, Fault> {
    Err(Fault::new("database unavailable"))
}

pub fn secret(_: &mut RequestContext) -> Result<String, Fault> {
    SECURE_CALLS.fetch_add(1, Ordering::SeqCst);
    Ok("classified".to_string())
}

pub fn staff_only(
    token: Option<&str>,
    _realm: &str,
    _method: HttpMethod,
    response: &mut ResponseBuilder,
) -> bool {
    if token == Some("letmein") {
        return true;
    }
    response
        .set_status(StatusCode::UNAUTHORIZED)
        .set_message("Not authorized");
    false
}

pub fn states_service() -> ServiceDeclaration {
    ServiceDeclaration::new("states")
        .root("/tutorial/")
        .consumes("application/json")
        .produces("application/json")
        .produces(SIREN_JSON)
        .gzip(true)
        .docs_path("/apidocs")
        .endpoint(
            EndpointDeclaration::get("/states/{name:string}")
                .output("State")
                .operation(get_state),
        )
        .endpoint(
            EndpointDeclaration::get("/x/{a:string}/{b:int}")
                .output("String")
                .gzip(false)
                .operation(get_pair),
        )
        .endpoint(
            EndpointDeclaration::get("/lookup?{name:string}&{page:int32}&{exact:bool}")
                .output("String")
                .operation(lookup),
        )
        .endpoint(
            EndpointDeclaration::post("/states")
                .postdata("State")
                .operation(add_state),
        )
        .endpoint(
            EndpointDeclaration::put("/states/{id:int}")
                .postdata("State")
                .operation(update_state),
        )
        .endpoint(EndpointDeclaration::delete("/states/{id:int}").operation(remove_state))
        .endpoint(
            EndpointDeclaration::put("/states/{id:int}/touch")
                .postdata("State")
                .operation(touch_state),
        )
        .endpoint(EndpointDeclaration::head("/states/{name:string}").operation(check_state))
        .endpoint(EndpointDeclaration::options("/states").operation(state_options))
        .endpoint(
            EndpointDeclaration::get("/files/{...:string}")
                .output("Vec<String>")
                .operation(list_files),
        )
        .endpoint(
            EndpointDeclaration::get("/explode")
                .output("String")
                .operation(explode),
        )
        .endpoint(
            EndpointDeclaration::get("/broken")
                .output("String")
                .operation(broken),
        )
}

pub fn secure_service() -> ServiceDeclaration {
    ServiceDeclaration::new("secure")
        .root("/vault")
        .realm("staff")
        .endpoint(
            EndpointDeclaration::get("/secret")
                .output("String")
                .operation(secret),
        )
}

pub fn test_router() -> Router {
    let mut builder = Router::builder();
    builder
        .register_authorizer("staff", staff_only)
        .register_decorator(SIREN_JSON, SirenDecorator)
        .register_documentor(endpoint_router::docs::EndpointCatalog)
        .register_entity(
            "State",
            EntityMetadata::new("State")
                .key("Name")
                .href("/tutorial/states/{key}"),
        );
    builder.register(states_service()).unwrap();
    builder.register(secure_service()).unwrap();
    builder.build()
}

pub fn context(method: HttpMethod, url: &str, body: &'static [u8]) -> RequestContext {
    RequestContext::new(method, url, HeaderMap::new(), Bytes::from_static(body))
}

pub fn app() -> axum::Router {
    HttpServer::new(ServerConfig::default(), Arc::new(test_router())).app()
}

/// Send `request` through the full layered service.
pub async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, body)
}
