//! This module provides types for the configuration of a Warpresolver engine: the object and
//! input types of the GraphQL schema, the fields and arguments on those types, and the server
//! settings that govern caching and request deadlines.

use crate::engine::cache::{CacheMetadata, MaxAge};
use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::time::Duration;

pub(crate) const SCALAR_NAMES: [&str; 5] = ["Boolean", "Float", "ID", "Int", "String"];

/// Convenience function for setting serde default value
fn get_true() -> bool {
    true
}

fn get_default_server_name() -> String {
    "default".to_string()
}

/// Configuration item for a Warpresolver engine. The configuration contains the version of the
/// configuration file format, the server settings, and a vector of [`Type`] structures that
/// make up the GraphQL schema.
///
/// # Examples
///
/// ```rust
/// use warpresolver::engine::config::{Config, ServerConfig};
///
/// let c = Config::new(1, ServerConfig::default(), Vec::new());
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Version of the Warpresolver configuration file format used
    version: i32,

    /// Settings that apply to every request executed by the engine
    #[serde(default)]
    server: ServerConfig,

    /// A vector of [`Type`] structures, each defining one type in the GraphQL schema
    #[serde(default)]
    model: Vec<Type>,
}

impl Config {
    /// Creates a new [`Config`] data structure
    pub fn new(version: i32, server: ServerConfig, model: Vec<Type>) -> Config {
        Config {
            version,
            server,
            model,
        }
    }

    /// Creates a new [`Config`] data structure from the YAML contents of the specified config
    /// file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigOpenFailed`] if the file cannot be opened, and
    /// [`Error::DeserializationFailed`] if its contents are not a valid configuration.
    pub fn from_file(path: &str) -> Result<Config, Error> {
        let f = File::open(path)?;
        let r = BufReader::new(f);
        Ok(serde_yaml::from_reader(r)?)
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    pub fn model(&self) -> &[Type] {
        &self.model
    }

    pub(crate) fn type_by_name(&self, name: &str) -> Option<&Type> {
        self.model.iter().find(|t| t.name == name)
    }

    /// Validates the [`Config`] data structure. Checks that no type, field, or argument is
    /// defined twice, that no type takes the name of a GraphQL scalar, that a `Query` object type
    /// exists, that every field and argument refers to a known type of the right kind, and that
    /// argument defaults match the argument type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use warpresolver::engine::config::{Config, Field, ServerConfig, Type, TypeKind};
    ///
    /// let config = Config::new(1, ServerConfig::default(), vec![
    ///     Type::new("Query", TypeKind::Object, vec![Field::new("me", "String")]),
    /// ]);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<(), Error> {
        let mut type_names = HashSet::new();
        for t in &self.model {
            if !type_names.insert(t.name.as_str()) {
                return Err(Error::ConfigItemDuplicated {
                    type_name: t.name.clone(),
                });
            }

            if SCALAR_NAMES.contains(&t.name.as_str()) {
                return Err(Error::ConfigItemReserved {
                    type_name: t.name.clone(),
                });
            }
        }

        match self.type_by_name("Query") {
            Some(q) if q.kind == TypeKind::Object => (),
            _ => {
                return Err(Error::ConfigTypeNotFound {
                    type_name: "Query".to_string(),
                })
            }
        }

        for t in &self.model {
            let mut field_names = HashSet::new();
            for f in &t.fields {
                if !field_names.insert(f.name.as_str()) {
                    return Err(Error::ConfigItemDuplicated {
                        type_name: format!("{}::{}", t.name, f.name),
                    });
                }

                // object fields may return objects, input fields may only nest inputs
                self.validate_type_ref(&f.type_name, t.kind)?;

                let mut arg_names = HashSet::new();
                for a in &f.arguments {
                    if !arg_names.insert(a.name.as_str()) {
                        return Err(Error::ConfigItemDuplicated {
                            type_name: format!("{}::{}({})", t.name, f.name, a.name),
                        });
                    }
                    self.validate_type_ref(&a.type_name, TypeKind::Input)?;
                    a.validate_default()?;
                }
            }
        }

        Ok(())
    }

    fn validate_type_ref(&self, type_name: &str, kind: TypeKind) -> Result<(), Error> {
        if SCALAR_NAMES.contains(&type_name) {
            return Ok(());
        }

        match self.type_by_name(type_name) {
            Some(t) if t.kind == kind => Ok(()),
            _ => Err(Error::ConfigTypeNotFound {
                type_name: type_name.to_string(),
            }),
        }
    }
}

/// Server settings shared by every request the engine executes.
///
/// # Examples
///
/// ```rust
/// use warpresolver::engine::config::{CacheConfig, ServerConfig};
///
/// let s = ServerConfig::new("graphql_test")
///     .with_cache(CacheConfig::new(vec!["graphql_response".to_string()], vec![], None))
///     .with_timeout_ms(5000);
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Name of the server, available to resolvers as schema-level metadata
    #[serde(default = "get_default_server_name")]
    name: String,

    /// If false, every response is marked as uncacheable
    #[serde(default = "get_true")]
    caching: bool,

    /// Cache metadata attached to every response, in addition to what resolvers contribute
    #[serde(default)]
    cache: CacheConfig,

    /// Time allowed for a single request, in milliseconds. No deadline if absent.
    #[serde(default)]
    timeout_ms: Option<u64>,
}

impl ServerConfig {
    pub fn new(name: &str) -> ServerConfig {
        ServerConfig {
            name: name.to_string(),
            caching: true,
            cache: CacheConfig::default(),
            timeout_ms: None,
        }
    }

    pub fn with_caching(mut self, caching: bool) -> Self {
        self.caching = caching;
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn caching(&self) -> bool {
        self.caching
    }

    pub fn cache(&self) -> &CacheConfig {
        &self.cache
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig::new(&get_default_server_name())
    }
}

/// Default cache metadata for the responses of a server
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheConfig {
    #[serde(default)]
    tags: Vec<String>,

    #[serde(default)]
    contexts: Vec<String>,

    /// Maximum age in seconds. Permanent if absent.
    #[serde(default)]
    max_age: Option<u32>,
}

impl CacheConfig {
    pub fn new(tags: Vec<String>, contexts: Vec<String>, max_age: Option<u32>) -> CacheConfig {
        CacheConfig {
            tags,
            contexts,
            max_age,
        }
    }

    /// Returns the cache metadata every response of the server starts out with
    pub fn metadata(&self) -> CacheMetadata {
        CacheMetadata::new()
            .with_tags(self.tags.iter().cloned())
            .with_contexts(self.contexts.iter().cloned())
            .with_max_age(MaxAge::from(self.max_age))
    }
}

/// Distinguishes object types, which are returned by fields, from input types, which are
/// passed as field arguments.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeKind {
    Object,
    Input,
}

impl Default for TypeKind {
    fn default() -> Self {
        TypeKind::Object
    }
}

/// Configuration item for a GraphQL object or input type
///
/// # Examples
///
/// ```rust
/// use warpresolver::engine::config::{Field, Type, TypeKind};
///
/// let t = Type::new("Tree", TypeKind::Object, vec![Field::new("name", "String")]);
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Type {
    name: String,

    #[serde(default)]
    kind: TypeKind,

    #[serde(default)]
    fields: Vec<Field>,
}

impl Type {
    pub fn new(name: &str, kind: TypeKind, fields: Vec<Field>) -> Type {
        Type {
            name: name.to_string(),
            kind,
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}

/// Configuration item for a field on a GraphQL type
///
/// # Examples
///
/// ```rust
/// use warpresolver::engine::config::{Argument, Field};
///
/// let f = Field::new("id", "Int").with_arguments(vec![Argument::new("someArg", "Int")]);
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    name: String,

    /// The name of the type of the field (e.g. String, or the name of an object type)
    #[serde(rename = "type")]
    type_name: String,

    /// True if the field is non-nullable
    #[serde(default)]
    required: bool,

    /// True if the field is a list
    #[serde(default)]
    list: bool,

    #[serde(default)]
    arguments: Vec<Argument>,
}

impl Field {
    pub fn new(name: &str, type_name: &str) -> Field {
        Field {
            name: name.to_string(),
            type_name: type_name.to_string(),
            required: false,
            list: false,
            arguments: Vec::new(),
        }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_list(mut self, list: bool) -> Self {
        self.list = list;
        self
    }

    pub fn with_arguments(mut self, arguments: Vec<Argument>) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn list(&self) -> bool {
        self.list
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }
}

/// Configuration item for an argument of a field
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use warpresolver::engine::config::Argument;
///
/// let a = Argument::new("limit", "Int").with_default(json!(10));
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Argument {
    name: String,

    #[serde(rename = "type")]
    type_name: String,

    #[serde(default)]
    required: bool,

    #[serde(default)]
    list: bool,

    /// Value the engine injects when the argument is omitted from a query. Only supported for
    /// scalar arguments that are not lists.
    #[serde(default)]
    default: Option<serde_json::Value>,
}

impl Argument {
    pub fn new(name: &str, type_name: &str) -> Argument {
        Argument {
            name: name.to_string(),
            type_name: type_name.to_string(),
            required: false,
            list: false,
            default: None,
        }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_list(mut self, list: bool) -> Self {
        self.list = list;
        self
    }

    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn list(&self) -> bool {
        self.list
    }

    pub fn default(&self) -> Option<&serde_json::Value> {
        self.default.as_ref()
    }

    fn validate_default(&self) -> Result<(), Error> {
        let d = match &self.default {
            None => return Ok(()),
            Some(d) => d,
        };

        let valid = !self.list
            && match self.type_name.as_str() {
                "Boolean" => d.is_boolean(),
                "Float" => d.is_number(),
                "ID" | "String" => d.is_string(),
                "Int" => d
                    .as_i64()
                    .map_or(false, |i| i >= i64::from(i32::MIN) && i <= i64::from(i32::MAX)),
                _ => false,
            };

        if valid {
            Ok(())
        } else {
            Err(Error::ConfigDefaultInvalid {
                name: self.name.clone(),
            })
        }
    }
}

#[cfg(test)]
pub(crate) fn mock_tree_config() -> Config {
    Config::new(
        1,
        ServerConfig::new("graphql_test").with_cache(CacheConfig::new(
            vec!["graphql_response".to_string()],
            Vec::new(),
            None,
        )),
        vec![
            Type::new(
                "Query",
                TypeKind::Object,
                vec![
                    Field::new("me", "String"),
                    Field::new("tree", "Tree").with_arguments(vec![Argument::new("id", "Int")]),
                ],
            ),
            Type::new(
                "Tree",
                TypeKind::Object,
                vec![
                    Field::new("id", "Int").with_arguments(vec![Argument::new("someArg", "Int")]),
                    Field::new("name", "String"),
                    Field::new("uri", "String"),
                ],
            ),
        ],
    )
}
