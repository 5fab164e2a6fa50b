use super::{FieldArgs, Resolved, Resolver};
use crate::engine::cache::CacheMetadata;
use crate::engine::context::ResolveContext;
use crate::engine::producers::{DataProducerManager, ProducerArgs, ProducerDefinition};
use crate::engine::typed_data::{DataDefinition, DefinitionManager, TypedDataManager};
use crate::engine::value::Value;
use crate::error::Error;
use log::trace;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Type alias for the closures wrapped by a [`Callback`] resolver
pub type CallbackFunc =
    dyn Fn(&Value, &FieldArgs, &ResolveContext) -> Result<Resolved, Error> + Send + Sync;

/// Factory for the built-in resolvers. The builder holds the data producer manager consulted by
/// [`produce`] and the typed data manager consulted by [`from_path`]; both are looked up when
/// the resolver is built, so a misconfigured resolver fails before any query runs.
///
/// [`produce`]: #method.produce
/// [`from_path`]: #method.from_path
///
/// # Examples
///
/// ```rust
/// use warpresolver::engine::resolvers::{ResolverBuilder, ResolverRegistry};
///
/// let builder = ResolverBuilder::new();
/// let mut registry = ResolverRegistry::new();
///
/// registry.add_field_resolver("Query", "me", builder.from_value("Some string value"));
/// registry.add_field_resolver("Tree", "id", builder.from_argument("someArg"));
/// registry.add_field_resolver(
///     "Tree",
///     "name",
///     builder.produce("uppercase").unwrap()
///         .map("string", builder.from_parent()).unwrap(),
/// );
/// ```
#[derive(Clone, Debug)]
pub struct ResolverBuilder {
    producers: Arc<DataProducerManager>,
    typed_data: Arc<dyn TypedDataManager>,
}

impl ResolverBuilder {
    /// Creates a builder with the built-in data producers and no data definitions
    pub fn new() -> ResolverBuilder {
        ResolverBuilder {
            producers: Arc::new(DataProducerManager::new()),
            typed_data: Arc::new(DefinitionManager::new()),
        }
    }

    pub fn with_producers(mut self, producers: Arc<DataProducerManager>) -> Self {
        self.producers = producers;
        self
    }

    pub fn with_typed_data_manager(mut self, typed_data: Arc<dyn TypedDataManager>) -> Self {
        self.typed_data = typed_data;
        self
    }

    /// Resolves to `value`, regardless of parent and arguments
    pub fn from_value(&self, value: impl Into<Value>) -> FromValue {
        FromValue {
            value: value.into(),
        }
    }

    /// Resolves to the parent value
    pub fn from_parent(&self) -> FromParent {
        FromParent {}
    }

    /// Resolves to the field argument `name`, or null if the argument was not supplied
    pub fn from_argument(&self, name: &str) -> FromArgument {
        FromArgument {
            name: name.to_string(),
            fallback: None,
        }
    }

    /// Resolves by walking `path`, a dot-separated sequence of property names, through the
    /// parent value viewed as typed data of `data_type`. A path segment missing from the data
    /// resolves to null.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataDefinitionNotFound`] if `data_type` is unknown,
    /// [`Error::DataDefinitionNotComplex`] if it cannot be traversed, and
    /// [`Error::PathExpressionInvalid`] if `path` is empty or has an empty segment.
    pub fn from_path(&self, data_type: &str, path: &str) -> Result<FromPath, Error> {
        let definition = self.typed_data.definition(data_type)?;
        if !definition.is_complex() {
            return Err(Error::DataDefinitionNotComplex {
                data_type: data_type.to_string(),
            });
        }

        let segments = path.split('.').map(str::to_string).collect::<Vec<_>>();
        if path.is_empty() || segments.iter().any(String::is_empty) {
            return Err(Error::PathExpressionInvalid {
                path: path.to_string(),
            });
        }

        Ok(FromPath {
            definition,
            path: segments,
            typed_data: self.typed_data.clone(),
            value: None,
        })
    }

    /// Resolves by dispatching to the data producer `name`. Producer arguments are bound to
    /// resolvers with [`Produce::map`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProducerNotFound`] if no producer of that name is registered
    pub fn produce(&self, name: &str) -> Result<Produce, Error> {
        Ok(Produce {
            definition: self.producers.definition(name)?.clone(),
            arguments: Vec::new(),
        })
    }

    /// Chains `resolvers`, feeding the value of each in as the parent of the next
    pub fn compose(&self, resolvers: Vec<Box<dyn Resolver>>) -> Compose {
        Compose { resolvers }
    }

    /// Resolves by calling `f`
    pub fn callback<F>(&self, f: F) -> Callback
    where
        F: Fn(&Value, &FieldArgs, &ResolveContext) -> Result<Resolved, Error>
            + Send
            + Sync
            + 'static,
    {
        Callback { f: Box::new(f) }
    }

    /// Resolves with `resolver`, substituting `default` when it resolves to null
    pub fn default_value<R>(&self, resolver: R, default: impl Into<Value>) -> DefaultValue
    where
        R: Resolver + 'static,
    {
        DefaultValue {
            resolver: Box::new(resolver),
            default: default.into(),
        }
    }
}

impl Default for ResolverBuilder {
    fn default() -> Self {
        ResolverBuilder::new()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FromValue {
    value: Value,
}

impl Resolver for FromValue {
    fn resolve(
        &self,
        _parent: &Value,
        _args: &FieldArgs,
        _context: &ResolveContext,
    ) -> Result<Resolved, Error> {
        Ok(Resolved::new(self.value.clone()))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FromParent {}

impl Resolver for FromParent {
    fn resolve(
        &self,
        parent: &Value,
        _args: &FieldArgs,
        _context: &ResolveContext,
    ) -> Result<Resolved, Error> {
        Ok(Resolved::new(parent.clone()))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FromArgument {
    name: String,
    fallback: Option<Value>,
}

impl FromArgument {
    /// Resolves to `fallback` when the argument was not supplied. An argument explicitly set
    /// to null still resolves to null.
    pub fn with_fallback(mut self, fallback: impl Into<Value>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }
}

impl Resolver for FromArgument {
    fn resolve(
        &self,
        _parent: &Value,
        args: &FieldArgs,
        _context: &ResolveContext,
    ) -> Result<Resolved, Error> {
        match args.get(&self.name) {
            Some(v) => Ok(Resolved::new(v.clone())),
            None => {
                trace!("FromArgument::resolve -- argument {} absent", self.name);
                Ok(Resolved::new(self.fallback.clone().unwrap_or_default()))
            }
        }
    }
}

#[derive(Debug)]
pub struct FromPath {
    definition: DataDefinition,
    path: Vec<String>,
    typed_data: Arc<dyn TypedDataManager>,
    value: Option<Box<dyn Resolver>>,
}

impl FromPath {
    /// Walks the path through the value of `resolver` instead of the parent value
    pub fn with_value<R>(mut self, resolver: R) -> Self
    where
        R: Resolver + 'static,
    {
        self.value = Some(Box::new(resolver));
        self
    }
}

impl Resolver for FromPath {
    fn resolve(
        &self,
        parent: &Value,
        args: &FieldArgs,
        context: &ResolveContext,
    ) -> Result<Resolved, Error> {
        let (value, cache) = match &self.value {
            Some(r) => r.resolve(parent, args, context)?.into_parts(),
            None => (parent.clone(), CacheMetadata::new()),
        };

        if !matches!(value, Value::Map(_)) {
            trace!(
                "FromPath::resolve -- {} is not a {}",
                value.variant_name(),
                self.definition.data_type()
            );
            return Ok(Resolved::null().with_cache_metadata(cache));
        }

        let mut data = self.typed_data.create(&self.definition, value)?;
        for segment in &self.path {
            data = match data.get(segment) {
                Some(child) => child,
                None => {
                    trace!(
                        "FromPath::resolve -- segment {} of {} not found",
                        segment,
                        self.path.join(".")
                    );
                    return Ok(Resolved::null().with_cache_metadata(cache));
                }
            };
        }

        Ok(Resolved::new(data.value()).with_cache_metadata(cache))
    }
}

#[derive(Debug)]
pub struct Produce {
    definition: ProducerDefinition,
    arguments: Vec<(String, Box<dyn Resolver>)>,
}

impl Produce {
    /// Binds the producer argument `argument` to the value of `resolver`. Mapping an argument
    /// a second time replaces the earlier mapping.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProducerArgumentNotFound`] if the producer has no such argument
    pub fn map<R>(mut self, argument: &str, resolver: R) -> Result<Self, Error>
    where
        R: Resolver + 'static,
    {
        if self.definition.argument(argument).is_none() {
            return Err(Error::ProducerArgumentNotFound {
                producer: self.definition.name().to_string(),
                argument: argument.to_string(),
            });
        }

        self.arguments.retain(|(name, _)| name != argument);
        self.arguments
            .push((argument.to_string(), Box::new(resolver)));
        Ok(self)
    }
}

impl Resolver for Produce {
    #[tracing::instrument(
        level = "info",
        name = "wr-produce",
        skip(self, parent, args, context),
        fields(producer = %self.definition.name())
    )]
    fn resolve(
        &self,
        parent: &Value,
        args: &FieldArgs,
        context: &ResolveContext,
    ) -> Result<Resolved, Error> {
        let mut cache = CacheMetadata::new();
        let mut values = HashMap::new();
        for (name, resolver) in &self.arguments {
            let (value, c) = resolver.resolve(parent, args, context)?.into_parts();
            cache.merge(&c);
            values.insert(name.clone(), value);
        }

        for argument in self.definition.arguments() {
            if argument.required() && values.get(argument.name()).map_or(true, Value::is_null) {
                trace!(
                    "Produce::resolve -- required argument {} of {} is null",
                    argument.name(),
                    self.definition.name()
                );
                return Ok(Resolved::null().with_cache_metadata(cache));
            }
        }

        let (value, c) = self
            .definition
            .create_instance(ProducerArgs::new(values))?
            .resolve(parent, context)?
            .into_parts();
        cache.merge(&c);

        Ok(Resolved::new(value).with_cache_metadata(cache))
    }
}

#[derive(Debug)]
pub struct Compose {
    resolvers: Vec<Box<dyn Resolver>>,
}

impl Resolver for Compose {
    fn resolve(
        &self,
        parent: &Value,
        args: &FieldArgs,
        context: &ResolveContext,
    ) -> Result<Resolved, Error> {
        let mut value = parent.clone();
        let mut cache = CacheMetadata::new();
        for resolver in &self.resolvers {
            let (v, c) = resolver.resolve(&value, args, context)?.into_parts();
            cache.merge(&c);
            value = v;
        }

        Ok(Resolved::new(value).with_cache_metadata(cache))
    }
}

pub struct Callback {
    f: Box<CallbackFunc>,
}

impl Debug for Callback {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callback").finish()
    }
}

impl Resolver for Callback {
    fn resolve(
        &self,
        parent: &Value,
        args: &FieldArgs,
        context: &ResolveContext,
    ) -> Result<Resolved, Error> {
        (self.f)(parent, args, context)
    }
}

#[derive(Debug)]
pub struct DefaultValue {
    resolver: Box<dyn Resolver>,
    default: Value,
}

impl Resolver for DefaultValue {
    fn resolve(
        &self,
        parent: &Value,
        args: &FieldArgs,
        context: &ResolveContext,
    ) -> Result<Resolved, Error> {
        let (value, cache) = self.resolver.resolve(parent, args, context)?.into_parts();
        if value.is_null() {
            Ok(Resolved::new(self.default.clone()).with_cache_metadata(cache))
        } else {
            Ok(Resolved::new(value).with_cache_metadata(cache))
        }
    }
}
