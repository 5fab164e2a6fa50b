//! This module provides the Warpresolver engine, which executes GraphQL queries against a schema
//! generated from a [`Config`], resolving every field through the [`ResolverRegistry`] and
//! aggregating the cache metadata of the resolved fields into the response.

use cache::{CacheMetadata, MaxAge};
use config::{Config, ServerConfig, TypeKind};
use context::ResolveContext;
use juniper::http::GraphQLRequest;
use log::{debug, trace};
use resolvers::ResolverRegistry;
use schema::{create_root_node, RootRef};
use std::collections::HashMap;
use std::convert::TryFrom;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Instant;
use storage::EntityStorage;
use value::Value;

use crate::error::Error;

pub mod cache;
pub mod config;
pub mod context;
mod objects;
pub mod producers;
pub mod resolvers;
pub mod schema;
pub mod storage;
pub mod typed_data;
pub mod value;

pub struct EngineBuilder {
    config: Config,
    registry: ResolverRegistry,
    storage: Option<Arc<dyn EntityStorage>>,
    version: Option<String>,
}

impl EngineBuilder {
    /// Sets the resolver registry of the engine
    ///
    /// # Examples
    ///
    /// ```rust
    /// use warpresolver::engine::Engine;
    /// use warpresolver::engine::config::{Config, Field, ServerConfig, Type, TypeKind};
    /// use warpresolver::engine::resolvers::{ResolverBuilder, ResolverRegistry};
    ///
    /// let config = Config::new(1, ServerConfig::default(), vec![
    ///     Type::new("Query", TypeKind::Object, vec![Field::new("me", "String")]),
    /// ]);
    ///
    /// let builder = ResolverBuilder::new();
    /// let mut registry = ResolverRegistry::new();
    /// registry.add_field_resolver("Query", "me", builder.from_value("Some string value"));
    ///
    /// let engine = Engine::new(config)
    ///     .with_registry(registry)
    ///     .build().unwrap();
    /// ```
    pub fn with_registry(mut self, registry: ResolverRegistry) -> EngineBuilder {
        self.registry = registry;
        self
    }

    /// Sets the back-end the entity data producers load from
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use warpresolver::engine::Engine;
    /// use warpresolver::engine::config::{Config, Field, ServerConfig, Type, TypeKind};
    /// use warpresolver::engine::storage::MemoryStorage;
    ///
    /// let config = Config::new(1, ServerConfig::default(), vec![
    ///     Type::new("Query", TypeKind::Object, vec![Field::new("me", "String")]),
    /// ]);
    ///
    /// let engine = Engine::new(config)
    ///     .with_storage(Arc::new(MemoryStorage::new()))
    ///     .build().unwrap();
    /// ```
    pub fn with_storage(mut self, storage: Arc<dyn EntityStorage>) -> EngineBuilder {
        self.storage = Some(storage);
        self
    }

    /// Sets the version of the schema served, available to resolvers through the context
    pub fn with_version(mut self, version: String) -> EngineBuilder {
        self.version = Some(version);
        self
    }

    /// Builds a configured [`Engine`], generating the GraphQL schema from the [`Config`].
    ///
    /// # Errors
    ///
    /// Returns the validation [`Error`] of the config if it is invalid, and
    /// [`Error::SchemaItemNotFound`] if the registry holds a resolver for a field that no object
    /// type in the config defines.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use warpresolver::engine::Engine;
    /// use warpresolver::engine::config::{Config, ServerConfig};
    ///
    /// let config = Config::new(1, ServerConfig::default(), Vec::new());
    ///
    /// assert!(Engine::new(config).build().is_err());
    /// ```
    pub fn build(self) -> Result<Engine, Error> {
        EngineBuilder::validate_engine(&self.registry, &self.config)?;

        let root_node = create_root_node(&self.config)?;

        Ok(Engine {
            server: Arc::new(self.config.server().clone()),
            config: self.config,
            registry: Arc::new(self.registry),
            storage: self.storage,
            version: self.version,
            root_node,
        })
    }

    fn validate_engine(registry: &ResolverRegistry, config: &Config) -> Result<(), Error> {
        config.validate().map_err(|e| {
            debug!("EngineBuilder::validate_engine -- config invalid: {}", e);
            e
        })?;

        for (type_name, field_name) in registry.field_keys() {
            let defined = config
                .type_by_name(type_name)
                .filter(|t| t.kind() == TypeKind::Object)
                .map_or(false, |t| t.fields().iter().any(|f| f.name() == field_name));

            if !defined {
                return Err(Error::SchemaItemNotFound {
                    name: type_name.to_string() + "::" + field_name,
                });
            }
        }

        Ok(())
    }
}

/// A Warpresolver GraphQL engine.
///
/// The [`Engine`] executes GraphQL queries against the schema described by its [`Config`].
/// Every field is resolved by the resolver registered for it, or read from the parent value if
/// none is registered. The response reports the cache metadata of everything resolved.
///
/// # Examples
///
/// ```rust
/// use warpresolver::GraphQLRequest;
/// use warpresolver::engine::Engine;
/// use warpresolver::engine::config::{Config, Field, ServerConfig, Type, TypeKind};
/// use warpresolver::engine::resolvers::{ResolverBuilder, ResolverRegistry};
///
/// let config = Config::new(1, ServerConfig::default(), vec![
///     Type::new("Query", TypeKind::Object, vec![Field::new("me", "String")]),
/// ]);
///
/// let builder = ResolverBuilder::new();
/// let mut registry = ResolverRegistry::new();
/// registry.add_field_resolver("Query", "me", builder.from_value("Some string value"));
///
/// let engine = Engine::new(config).with_registry(registry).build().unwrap();
///
/// let request = GraphQLRequest::new("query { me }".to_string(), None, None);
/// let response = engine.execute(&request).unwrap();
///
/// assert_eq!(response.data().unwrap()["me"], "Some string value");
/// ```
#[derive(Clone)]
pub struct Engine {
    config: Config,
    server: Arc<ServerConfig>,
    registry: Arc<ResolverRegistry>,
    storage: Option<Arc<dyn EntityStorage>>,
    version: Option<String>,
    root_node: RootRef,
}

impl Engine {
    /// Creates a new [`EngineBuilder`] for the configuration `config`
    #[allow(clippy::new_ret_no_self)]
    pub fn new(config: Config) -> EngineBuilder {
        EngineBuilder {
            config,
            registry: ResolverRegistry::new(),
            storage: None,
            version: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Executes a GraphQL request and returns the response body along with the cache metadata of
    /// the response.
    ///
    /// Errors raised by resolvers are reported in the `errors` of the response body, and the
    /// failed fields contribute no cache metadata. No cache metadata is reported for a request
    /// rejected before execution, or for one aborted at the request deadline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeConversionFailed`] if the request variables cannot be converted, and
    /// [`Error::SerializationFailed`] if the response cannot be serialized.
    #[tracing::instrument(level = "info", name = "wr-execute", skip(self, request))]
    pub fn execute(&self, request: &GraphQLRequest) -> Result<Response, Error> {
        trace!(
            "Engine::execute called -- operation_name: {:?}",
            request.operation_name()
        );

        let request_body = serde_json::to_value(request)?;
        let mut variables = HashMap::new();
        if let Some(serde_json::Value::Object(vars)) = request_body.get("variables") {
            for (k, v) in vars {
                variables.insert(k.clone(), Value::try_from(v.clone())?);
            }
        }

        let mut ctx = ResolveContext::new(self.registry.clone())
            .with_server(self.server.clone())
            .with_storage(self.storage.clone())
            .with_variables(variables)
            .with_version(self.version.clone())
            .with_cache_metadata(self.server.cache().metadata());
        if let Some(timeout) = self.server.timeout() {
            ctx = ctx.with_deadline(Instant::now() + timeout);
        }

        let res = request.execute_sync(&self.root_node, &ctx);
        if !res.is_ok() {
            debug!("Engine::execute -- response has errors");
        }
        let body = serde_json::to_value(&res)?;
        trace!("Engine::execute -- response: {}", body);

        let executed = body.get("data").map_or(false, |d| !d.is_null());
        let cache = if executed && !ctx.is_aborted() {
            let metadata = ctx.cache_metadata();
            if self.server.caching() {
                Some(metadata)
            } else {
                Some(metadata.with_max_age(MaxAge::Seconds(0)))
            }
        } else {
            None
        };

        Ok(Response::new(body, cache))
    }
}

impl Debug for Engine {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("storage", &self.storage)
            .field("version", &self.version)
            .finish()
    }
}

/// The outcome of executing a request: the GraphQL response body, and the cache metadata of the
/// response if it may be cached.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    body: serde_json::Value,
    cache: Option<CacheMetadata>,
}

impl Response {
    fn new(body: serde_json::Value, cache: Option<CacheMetadata>) -> Response {
        Response { body, cache }
    }

    pub fn body(&self) -> &serde_json::Value {
        &self.body
    }

    pub fn data(&self) -> Option<&serde_json::Value> {
        self.body.get("data")
    }

    pub fn errors(&self) -> Option<&serde_json::Value> {
        self.body.get("errors")
    }

    /// Returns the cache metadata of the response. None if the request was rejected before
    /// execution or timed out.
    pub fn cache_metadata(&self) -> Option<&CacheMetadata> {
        self.cache.as_ref()
    }

    pub fn into_body(self) -> serde_json::Value {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::Engine;
    use crate::engine::cache::MaxAge;
    use crate::engine::config::{mock_tree_config, Config, ServerConfig};
    use crate::engine::resolvers::{ResolverBuilder, ResolverRegistry};
    use crate::error::Error;
    use juniper::http::GraphQLRequest;
    use serde_json::json;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Passes if an engine builds for a valid config and an empty registry
    #[test]
    fn engine_new() {
        init();

        assert!(Engine::new(mock_tree_config()).build().is_ok());
    }

    /// Passes if an invalid config is refused
    #[test]
    fn engine_invalid_config() {
        init();

        let c = Config::new(1, ServerConfig::default(), Vec::new());
        assert!(matches!(
            Engine::new(c).build(),
            Err(Error::ConfigTypeNotFound { .. })
        ));
    }

    /// Passes if a resolver for a field missing from the schema is refused
    #[test]
    fn engine_unknown_field() {
        init();

        let b = ResolverBuilder::new();
        let registry =
            ResolverRegistry::new().with_field_resolver("Tree", "height", b.from_value(1));

        assert!(matches!(
            Engine::new(mock_tree_config()).with_registry(registry).build(),
            Err(Error::SchemaItemNotFound { name }) if name == "Tree::height"
        ));
    }

    /// Passes if a query resolves, with the server cache tags in the response metadata
    #[test]
    fn execute_query() {
        init();

        let b = ResolverBuilder::new();
        let registry = ResolverRegistry::new().with_field_resolver(
            "Query",
            "me",
            b.from_value("Some string value"),
        );
        let engine = Engine::new(mock_tree_config())
            .with_registry(registry)
            .build()
            .unwrap();

        let response = engine
            .execute(&GraphQLRequest::new("query { me }".to_string(), None, None))
            .unwrap();

        assert_eq!(response.data(), Some(&json!({"me": "Some string value"})));
        assert!(response.errors().is_none());
        let cache = response.cache_metadata().unwrap();
        assert!(cache.tags().contains("graphql_response"));
        assert_eq!(cache.max_age(), MaxAge::Permanent);
    }

    /// Passes if a malformed query reports errors and no cache metadata
    #[test]
    fn execute_invalid_query() {
        init();

        let engine = Engine::new(mock_tree_config()).build().unwrap();
        let response = engine
            .execute(&GraphQLRequest::new("query { height }".to_string(), None, None))
            .unwrap();

        assert!(response.errors().is_some());
        assert!(response.cache_metadata().is_none());
    }
}
