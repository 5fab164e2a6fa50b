//! Warpresolver executes GraphQL queries against a schema described in a configuration file,
//! resolving every field through a registry of resolvers. Resolvers are assembled from a small
//! set of building blocks: constant values, the parent value, field arguments, paths through
//! typed data, and named data producers. Each resolved field may carry cache metadata (tags,
//! contexts, and a maximum age), and the engine reports the union of the metadata of every
//! field in a response, so that the response can be cached and invalidated precisely.
//!
//! # Examples
//!
//! ```rust
//! use warpresolver::{Config, Engine, GraphQLRequest, ResolverBuilder, ResolverRegistry};
//! use warpresolver::engine::config::{Field, ServerConfig, Type, TypeKind};
//!
//! let config = Config::new(1, ServerConfig::default(), vec![
//!     Type::new("Query", TypeKind::Object, vec![Field::new("tree", "Tree")]),
//!     Type::new("Tree", TypeKind::Object, vec![Field::new("name", "String")]),
//! ]);
//!
//! let builder = ResolverBuilder::new();
//! let mut registry = ResolverRegistry::new();
//! registry.add_field_resolver("Query", "tree", builder.from_value("Some string value"));
//! registry.add_field_resolver("Tree", "name", builder.from_parent());
//!
//! let engine = Engine::new(config).with_registry(registry).build().unwrap();
//! let response = engine
//!     .execute(&GraphQLRequest::new("query { tree { name } }".to_string(), None, None))
//!     .unwrap();
//!
//! assert_eq!(response.data().unwrap()["tree"]["name"], "Some string value");
//! ```

#![doc(html_root_url = "https://docs.rs/warpresolver/0.1.0")]

pub use juniper::http::GraphQLRequest;

pub use engine::cache::{CacheMetadata, MaxAge};
pub use engine::config::Config;
pub use engine::context::ResolveContext;
pub use engine::resolvers::{FieldArgs, Resolved, Resolver, ResolverBuilder, ResolverRegistry};
pub use engine::value::Value;
pub use engine::{Engine, EngineBuilder, Response};
pub use error::Error;

pub mod engine;
pub mod error;
