mod setup;

use serde_json::json;
use setup::{init, query, query_with_variables, test_engine};
use std::convert::TryFrom;
use std::sync::Arc;
use warpresolver::engine::typed_data::{DataDefinition, DefinitionManager};
use warpresolver::{Resolved, ResolverBuilder, ResolverRegistry, Value};

fn tree_value() -> Value {
    Value::try_from(json!({
        "name": "Oak",
        "links": {
            "front": "<front>",
            "back": "/trees/1/back"
        }
    }))
    .unwrap()
}

/// Passes if a constant value resolves a root field
#[test]
fn from_value_root() {
    init();

    let b = ResolverBuilder::new();
    let registry = ResolverRegistry::new().with_field_resolver(
        "Query",
        "me",
        b.from_value("Some string value"),
    );
    let engine = test_engine(registry);

    let response = query(&engine, "query { me }");

    assert_eq!(response.data(), Some(&json!({"me": "Some string value"})));
    assert!(response.errors().is_none());
}

/// Passes if a nested field resolves to its parent value
#[test]
fn from_parent_nested() {
    init();

    let b = ResolverBuilder::new();
    let registry = ResolverRegistry::new()
        .with_field_resolver("Query", "tree", b.from_value("Some string value"))
        .with_field_resolver("Tree", "name", b.from_parent());
    let engine = test_engine(registry);

    let response = query(&engine, "query { tree { name } }");

    assert_eq!(
        response.data(),
        Some(&json!({"tree": {"name": "Some string value"}}))
    );
}

/// Passes if a field argument is passed through instead of the parent property of the same
/// name, and an omitted one resolves to null
#[test]
fn from_argument_nested() {
    init();

    let b = ResolverBuilder::new();
    let tree = Value::try_from(json!({"name": "some tree", "id": 5})).unwrap();
    let registry = ResolverRegistry::new()
        .with_field_resolver("Query", "tree", b.from_value(tree))
        .with_field_resolver("Tree", "id", b.from_argument("someArg"));
    let engine = test_engine(registry);

    let response = query(&engine, "{ tree(id: 5) { id(someArg: 234) } }");
    assert_eq!(response.data(), Some(&json!({"tree": {"id": 234}})));

    let response = query(&engine, "{ tree { id } }");
    assert_eq!(response.data(), Some(&json!({"tree": {"id": null}})));
}

/// Passes if request variables reach field arguments and the resolve context
#[test]
fn request_variables() {
    init();

    let b = ResolverBuilder::new();
    let tree = Value::try_from(json!({"name": "some tree", "id": 5})).unwrap();
    let registry = ResolverRegistry::new()
        .with_field_resolver(
            "Query",
            "me",
            b.callback(|_parent, _args, ctx| {
                Ok(Resolved::new(ctx.variable("n").cloned().unwrap_or_default()))
            }),
        )
        .with_field_resolver("Query", "tree", b.from_value(tree))
        .with_field_resolver("Tree", "id", b.from_argument("someArg"));
    let engine = test_engine(registry);

    let response = query_with_variables(
        &engine,
        "query($n: Int) { me tree { id(someArg: $n) } }",
        json!({"n": 234}),
    );

    assert!(response.errors().is_none());
    assert_eq!(
        response.data(),
        Some(&json!({"me": "234", "tree": {"id": 234}}))
    );
}

/// Passes if a fallback value is used for an omitted argument
#[test]
fn from_argument_fallback() {
    init();

    let b = ResolverBuilder::new();
    let registry = ResolverRegistry::new()
        .with_field_resolver("Query", "tree", b.from_value("Some string value"))
        .with_field_resolver("Tree", "id", b.from_argument("someArg").with_fallback(7));
    let engine = test_engine(registry);

    let response = query(&engine, "query { tree { id } }");

    assert_eq!(response.data(), Some(&json!({"tree": {"id": 7}})));
}

/// Passes if a path is walked through typed data, and a missing segment resolves to null
#[test]
fn from_path_nested() {
    init();

    let b = ResolverBuilder::new().with_typed_data_manager(Arc::new(
        DefinitionManager::new().with_definition(DataDefinition::complex("tree")),
    ));
    let registry = ResolverRegistry::new()
        .with_field_resolver("Query", "tree", b.from_value(tree_value()))
        .with_field_resolver("Tree", "uri", b.from_path("tree", "links.front").unwrap())
        .with_field_resolver(
            "Tree",
            "canonical",
            b.from_path("tree", "links.canonical").unwrap(),
        );
    let engine = test_engine(registry);

    let response = query(&engine, "query { tree { name uri canonical } }");

    assert_eq!(
        response.data(),
        Some(&json!({"tree": {"name": "Oak", "uri": "<front>", "canonical": null}}))
    );
    assert!(response.errors().is_none());
}

/// Passes if a path resolver refuses an unknown data type before any query runs
#[test]
fn from_path_unknown_definition() {
    init();

    let b = ResolverBuilder::new();

    assert!(b.from_path("tree", "links.front").is_err());
}

/// Passes if a data producer resolves a field, with its argument mapped from the parent
#[test]
fn produce_nested() {
    init();

    let b = ResolverBuilder::new();
    let registry = ResolverRegistry::new()
        .with_field_resolver("Query", "tree", b.from_value(tree_value()))
        .with_field_resolver(
            "Tree",
            "name",
            b.produce("uppercase")
                .unwrap()
                .map(
                    "string",
                    b.compose(vec![
                        Box::new(b.from_parent()),
                        Box::new(b.callback(|parent, _args, _ctx| {
                            Ok(Resolved::new(parent.get("name").cloned().unwrap_or_default()))
                        })),
                    ]),
                )
                .unwrap(),
        );
    let engine = test_engine(registry);

    let response = query(&engine, "query { tree { name } }");

    assert_eq!(response.data(), Some(&json!({"tree": {"name": "OAK"}})));
}

/// Passes if a list of objects resolves each item against the nested resolvers
#[test]
fn list_of_objects() {
    init();

    let b = ResolverBuilder::new();
    let trees = Value::try_from(json!([{"name": "Oak"}, {"name": "Elm"}])).unwrap();
    let registry =
        ResolverRegistry::new().with_field_resolver("Query", "trees", b.from_value(trees));
    let engine = test_engine(registry);

    let response = query(&engine, "query { trees { name } }");

    assert_eq!(
        response.data(),
        Some(&json!({"trees": [{"name": "Oak"}, {"name": "Elm"}]}))
    );
}

/// Passes if a default value replaces a null result
#[test]
fn default_value_nested() {
    init();

    let b = ResolverBuilder::new();
    let registry = ResolverRegistry::new()
        .with_field_resolver("Query", "tree", b.from_value(tree_value()))
        .with_field_resolver(
            "Tree",
            "uri",
            b.default_value(b.from_argument("missing"), "/trees/default"),
        );
    let engine = test_engine(registry);

    let response = query(&engine, "query { tree { uri } }");

    assert_eq!(
        response.data(),
        Some(&json!({"tree": {"uri": "/trees/default"}}))
    );
}
