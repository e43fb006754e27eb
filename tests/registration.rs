//! Registration rules: uniqueness, ambiguity, operation shapes and config-driven services.

mod common;

use axum::http::StatusCode;

use common::{context, get_pair, get_state, list_files, states_service};
use endpoint_router::config::parse_config;
use endpoint_router::{
    ConfigurationError, EndpointDeclaration, HttpMethod, OperationTable, Router, ServiceDeclaration,
};

fn register(endpoints: Vec<EndpointDeclaration>) -> Result<Router, ConfigurationError> {
    let mut service = ServiceDeclaration::new("svc").root("/api");
    for endpoint in endpoints {
        service = service.endpoint(endpoint);
    }
    let mut builder = Router::builder();
    builder.register(service)?;
    Ok(builder.build())
}

fn variadic(path: &str) -> EndpointDeclaration {
    EndpointDeclaration::get(path)
        .output("Vec<String>")
        .operation(list_files)
}

#[test]
fn test_same_structure_different_names_rejected() {
    let err = register(vec![
        EndpointDeclaration::get("/states/{name:string}")
            .output("State")
            .operation(get_state),
        EndpointDeclaration::get("/states/{abbreviation:string}")
            .output("State")
            .operation(get_state),
    ])
    .unwrap_err();
    assert!(matches!(err, ConfigurationError::DuplicateStructure { .. }));
}

#[test]
fn test_duplicate_signature_rejected() {
    let err = register(vec![
        EndpointDeclaration::get("/states/{name:string}")
            .output("State")
            .operation(get_state),
        EndpointDeclaration::get("states/{name:string}/")
            .output("State")
            .operation(get_state),
    ])
    .unwrap_err();
    assert!(matches!(err, ConfigurationError::DuplicateSignature { .. }));
}

#[test]
fn test_same_pattern_on_other_method_accepted() {
    let router = register(vec![
        EndpointDeclaration::get("/states/{name:string}")
            .output("State")
            .operation(get_state),
        EndpointDeclaration::head("/states/{name:string}")
            .output("State")
            .operation(get_state),
    ])
    .unwrap();
    assert_eq!(router.endpoints().len(), 2);
}

#[test]
fn test_overlapping_variable_roots_rejected_in_either_order() {
    let err = register(vec![variadic("/files/{...:string}"), variadic("/files/deep/{...:string}")])
        .unwrap_err();
    assert!(matches!(err, ConfigurationError::AmbiguousVariableRoot { .. }));

    let err = register(vec![variadic("/files/deep/{...:string}"), variadic("/files/{...:string}")])
        .unwrap_err();
    assert!(matches!(err, ConfigurationError::AmbiguousVariableRoot { .. }));
}

#[test]
fn test_fixed_endpoint_under_variable_root_rejected() {
    let err = register(vec![
        variadic("/files/{...:string}"),
        EndpointDeclaration::get("/files/{name:string}")
            .output("State")
            .operation(get_state),
    ])
    .unwrap_err();
    assert!(matches!(err, ConfigurationError::AmbiguousVariableRoot { .. }));
}

#[test]
fn test_disjoint_variable_roots_accepted() {
    let router = register(vec![variadic("/files/{...:string}"), variadic("/docs/{...:string}")]);
    assert!(router.is_ok());
}

fn lookup_state(path: &str) -> EndpointDeclaration {
    EndpointDeclaration::get(path)
        .output("State")
        .operation(get_state)
}

fn literal(path: &str) -> EndpointDeclaration {
    EndpointDeclaration::get(path)
        .output("String")
        .operation(common::broken)
}

#[test]
fn test_fixed_patterns_sharing_a_path_rejected_in_either_order() {
    for (first, second) in [
        ("/a/{x:string}/c", "/a/b/{y:string}"),
        ("/a/b/{y:string}", "/a/{x:string}/c"),
        ("/{x:string}/b", "/a/{y:string}"),
        ("/a/{y:string}", "/{x:string}/b"),
    ] {
        let err = register(vec![lookup_state(first), lookup_state(second)]).unwrap_err();
        match err {
            ConfigurationError::AmbiguousSignature { existing, .. } => {
                assert_eq!(existing, format!("api{first}"));
            }
            other => panic!("unexpected error for {first} / {second}: {other}"),
        }
    }
}

#[test]
fn test_fixed_patterns_with_conflicting_literal_accepted() {
    let router = register(vec![lookup_state("/a/{x:string}/c"), lookup_state("/a/{y:string}/d")])
        .unwrap();
    let matched = router.resolve(HttpMethod::Get, "/api/a/b/d").unwrap();
    assert_eq!(matched.endpoint.signature, "api/a/{y:string}/d");
}

#[test]
fn test_literal_path_beside_parameter_resolves_exactly() {
    for endpoints in [
        vec![lookup_state("/a/{x:string}"), literal("/a/b")],
        vec![literal("/a/b"), lookup_state("/a/{x:string}")],
    ] {
        let router = register(endpoints).unwrap();
        let exact = router.resolve(HttpMethod::Get, "/api/a/b").unwrap();
        assert_eq!(exact.endpoint.signature, "api/a/b");
        let shaped = router.resolve(HttpMethod::Get, "/api/a/z").unwrap();
        assert_eq!(shaped.endpoint.signature, "api/a/{x:string}");
    }
}

#[test]
fn test_operation_shape_mismatch_rejected() {
    let err = register(vec![EndpointDeclaration::get("/states/{name:string}")
        .output("State")
        .operation(get_pair)])
    .unwrap_err();
    match err {
        ConfigurationError::OperationMismatch { endpoint, .. } => {
            assert_eq!(endpoint, "GET /states/{name:string}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_operation_rejected() {
    let err = register(vec![EndpointDeclaration::get("/states").output("State")]).unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::MissingDeclaration { field: "operation", .. }
    ));
}

#[test]
fn test_body_method_requires_postdata() {
    let err = register(vec![EndpointDeclaration::post("/states").operation(common::add_state)])
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::MissingDeclaration { field: "postdata", .. }
    ));
}

#[test]
fn test_duplicate_service_rejected() {
    let mut builder = Router::builder();
    builder.register(states_service()).unwrap();
    let err = builder
        .register(ServiceDeclaration::new("states").root("/other"))
        .unwrap_err();
    assert_eq!(err, ConfigurationError::DuplicateService("states".into()));
}

#[test]
fn test_resolution_independent_of_registration_order() {
    let forward = register(vec![
        EndpointDeclaration::get("/states/{name:string}")
            .output("State")
            .operation(get_state),
        EndpointDeclaration::get("/x/{a:string}/{b:int}")
            .output("String")
            .operation(get_pair),
    ])
    .unwrap();
    let reverse = register(vec![
        EndpointDeclaration::get("/x/{a:string}/{b:int}")
            .output("String")
            .operation(get_pair),
        EndpointDeclaration::get("/states/{name:string}")
            .output("State")
            .operation(get_state),
    ])
    .unwrap();

    for url in ["/api/states/Ohio", "/api/x/y/3", "/api/none"] {
        let a = forward
            .resolve(HttpMethod::Get, url)
            .map(|m| m.endpoint.signature.clone());
        let b = reverse
            .resolve(HttpMethod::Get, url)
            .map(|m| m.endpoint.signature.clone());
        assert_eq!(a, b, "{url}");
    }
}

const SERVICES_TOML: &str = r#"
[[services]]
name = "config-states"
root = "/conf"
produces = ["application/json"]

[[services.endpoints]]
name = "getState"
method = "GET"
path = "/states/{name:string}"
output = "State"

[[services.endpoints]]
name = "getPair"
method = "GET"
path = "/x/{a:string}/{b:int}"
output = "string"
gzip = false
"#;

fn operations() -> OperationTable {
    let mut operations = OperationTable::new();
    operations
        .insert("getState", get_state)
        .insert("getPair", get_pair);
    operations
}

#[test]
fn test_register_config_services() {
    let config = parse_config(SERVICES_TOML).unwrap();
    let mut builder = Router::builder();
    builder.register_config(&config.services, &operations()).unwrap();
    let router = builder.build();

    assert_eq!(router.services()[0].name, "config-states");
    assert_eq!(router.endpoints()[0].name, "getState");
    assert!(!router.endpoints()[1].gzip);

    let mut ctx = context(HttpMethod::Get, "/conf/x/a/5", b"");
    router.dispatch(&mut ctx).unwrap();
    assert_eq!(ctx.response().status(), Some(StatusCode::OK));
    assert_eq!(ctx.response().payload().map(|b| b.as_ref()), Some(br#""a:5""#.as_ref()));
}

#[test]
fn test_register_config_unknown_operation() {
    let config = parse_config(SERVICES_TOML).unwrap();
    let mut builder = Router::builder();
    let err = builder
        .register_config(&config.services, &OperationTable::new())
        .unwrap_err();
    assert_eq!(err, ConfigurationError::OperationNotFound("getState".into()));
}

#[test]
fn test_register_config_unknown_method() {
    let toml = SERVICES_TOML.replace(r#"method = "GET""#, r#"method = "FETCH""#);
    let config = parse_config(&toml).unwrap();
    let mut builder = Router::builder();
    let err = builder
        .register_config(&config.services, &operations())
        .unwrap_err();
    assert_eq!(err, ConfigurationError::UnknownMethod("FETCH".into()));
}
