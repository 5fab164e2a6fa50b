#![allow(dead_code)]

use juniper::InputValue;
use warpresolver::engine::config::Config;
use warpresolver::{Engine, GraphQLRequest, Response, ResolverRegistry};

pub(crate) fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub(crate) fn load_config() -> Config {
    Config::from_file("./tests/fixtures/config.yml").expect("Failed to load test config")
}

pub(crate) fn test_engine(registry: ResolverRegistry) -> Engine {
    Engine::new(load_config())
        .with_registry(registry)
        .build()
        .expect("Failed to build test engine")
}

pub(crate) fn query(engine: &Engine, query: &str) -> Response {
    engine
        .execute(&GraphQLRequest::new(query.to_string(), None, None))
        .expect("Failed to execute query")
}

pub(crate) fn query_with_variables(
    engine: &Engine,
    query: &str,
    variables: serde_json::Value,
) -> Response {
    let variables: InputValue =
        serde_json::from_value(variables).expect("Failed to parse query variables");
    engine
        .execute(&GraphQLRequest::new(
            query.to_string(),
            None,
            Some(variables),
        ))
        .expect("Failed to execute query")
}
