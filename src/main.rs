//! endpoint-router binary.
//!
//! Serves the reference service: either declared in code, or declared in the
//! `[[services]]` tables of a TOML config with operations bound by name.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;

use endpoint_router::config::{load_config, RouterConfig};
use endpoint_router::docs::EndpointCatalog;
use endpoint_router::hypermedia::{EntityMetadata, SirenDecorator, SIREN_JSON};
use endpoint_router::lifecycle::startup;
use endpoint_router::observability::logging;
use endpoint_router::{
    ConfigurationError, EndpointDeclaration, Fault, OperationTable, RequestContext, Router,
    ServiceDeclaration, Shutdown,
};

#[derive(Debug, Parser)]
#[command(name = "endpoint-router", version, about = "Declarative HTTP endpoint router")]
struct Cli {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override `server.bind_address`.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }

    logging::init(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "endpoint-router starting");

    let router = build_router(&config)?;
    startup::run(config, router, Arc::new(Shutdown::new())).await?;
    Ok(())
}

fn build_router(config: &RouterConfig) -> Result<Router, ConfigurationError> {
    let mut builder = Router::builder();
    builder
        .register_decorator(SIREN_JSON, SirenDecorator)
        .register_documentor(EndpointCatalog)
        .register_entity(
            "State",
            EntityMetadata::new("State")
                .key("Name")
                .href("/galaga/dectest/state/{key}")
                .link("States", "/galaga/dectest/states")
                .action("edit", "PUT", "/galaga/dectest/state/{key}")
                .action("delete", "DELETE", "/galaga/dectest/state/{key}"),
        )
        .register_entity(
            "States",
            EntityMetadata::new("States")
                .href("/galaga/dectest/states")
                .action("newstate", "POST", "/galaga/dectest/state"),
        );

    if config.services.is_empty() {
        builder.register(reference_service())?;
    } else {
        builder.register_config(&config.services, &reference_operations())?;
    }
    Ok(builder.build())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct State {
    name: String,
    value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct States {
    count: usize,
    state: Vec<State>,
}

fn get_lookup(_: &mut RequestContext, name: String) -> Result<State, Fault> {
    Ok(State {
        name,
        value: "Decorator Test".to_string(),
    })
}

fn get_string(_: &mut RequestContext, name: String) -> Result<String, Fault> {
    Ok(name)
}

fn get_test(_: &mut RequestContext, name: String, test: String) -> Result<String, Fault> {
    Ok(name + &test)
}

fn get_array(_: &mut RequestContext, _name: String) -> Result<States, Fault> {
    let state: Vec<State> = [("Missouri", "MO"), ("Kansas", "KS"), ("Iowa", "IA"), ("Texas", "TX")]
        .into_iter()
        .map(|(name, value)| State {
            name: name.to_string(),
            value: value.to_string(),
        })
        .collect();
    Ok(States {
        count: state.len(),
        state,
    })
}

fn reference_operations() -> OperationTable {
    let mut operations = OperationTable::new();
    operations
        .insert("getLookup", get_lookup)
        .insert("getString", get_string)
        .insert("getTest", get_test)
        .insert("getArray", get_array);
    operations
}

fn reference_service() -> ServiceDeclaration {
    ServiceDeclaration::new("reference")
        .root("/galaga/dectest/")
        .consumes("application/json")
        .produces("application/json")
        .produces(SIREN_JSON)
        .produces("application/hal+json")
        .docs_path("/apidocs")
        .endpoint(
            EndpointDeclaration::get("/lookup?{name:string}")
                .name("getLookup")
                .output("State")
                .operation(get_lookup),
        )
        .endpoint(
            EndpointDeclaration::get("/string/{name:string}/{test:string}/multiple")
                .name("getTest")
                .output("string")
                .operation(get_test),
        )
        .endpoint(
            EndpointDeclaration::get("/string?{name:string}")
                .name("getString")
                .output("string")
                .operation(get_string),
        )
        .endpoint(
            EndpointDeclaration::get("/array?{name:string}")
                .name("getArray")
                .output("States")
                .operation(get_array),
        )
}
