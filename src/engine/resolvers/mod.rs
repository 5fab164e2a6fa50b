//! Contains the [`Resolver`] trait that computes the value of a GraphQL field, the
//! [`ResolverRegistry`] that maps schema fields onto resolvers, and the [`ResolverBuilder`] that
//! assembles the built-in resolvers.

use crate::engine::cache::CacheMetadata;
use crate::engine::context::ResolveContext;
use crate::engine::value::Value;
use crate::error::Error;
use std::collections::HashMap;
use std::fmt::Debug;

pub use builder::{
    Callback, Compose, DefaultValue, FromArgument, FromParent, FromPath, FromValue, Produce,
    ResolverBuilder,
};
pub use registry::{FieldResolver, PropertyResolver, ResolverRegistry};

mod builder;
mod registry;

/// Trait implemented by every field resolver. A resolver receives the value of the parent
/// object, the arguments of the field, and the per-request context, and returns the value of the
/// field together with the cache metadata the value depends on.
///
/// Resolvers are shared across concurrent requests and must not hold per-request state.
///
/// # Examples
///
/// ```rust
/// use warpresolver::engine::context::ResolveContext;
/// use warpresolver::engine::resolvers::{FieldArgs, Resolved, Resolver};
/// use warpresolver::engine::value::Value;
/// use warpresolver::Error;
///
/// #[derive(Debug)]
/// struct Greeting {}
///
/// impl Resolver for Greeting {
///     fn resolve(&self, _parent: &Value, _args: &FieldArgs, _context: &ResolveContext)
///         -> Result<Resolved, Error> {
///         Ok(Resolved::new("hello"))
///     }
/// }
/// ```
pub trait Resolver: Debug + Send + Sync {
    fn resolve(
        &self,
        parent: &Value,
        args: &FieldArgs,
        context: &ResolveContext,
    ) -> Result<Resolved, Error>;
}

impl Resolver for Box<dyn Resolver> {
    fn resolve(
        &self,
        parent: &Value,
        args: &FieldArgs,
        context: &ResolveContext,
    ) -> Result<Resolved, Error> {
        self.as_ref().resolve(parent, args, context)
    }
}

/// The outcome of a resolver: a value and the cache metadata it carries
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Resolved {
    value: Value,
    cache: CacheMetadata,
}

impl Resolved {
    pub fn new(value: impl Into<Value>) -> Resolved {
        Resolved {
            value: value.into(),
            cache: CacheMetadata::new(),
        }
    }

    pub fn null() -> Resolved {
        Resolved::default()
    }

    /// Merges `cache` into the metadata already carried
    pub fn with_cache_metadata(mut self, cache: CacheMetadata) -> Self {
        self.cache.merge(&cache);
        self
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn cache_metadata(&self) -> &CacheMetadata {
        &self.cache
    }

    pub fn into_parts(self) -> (Value, CacheMetadata) {
        (self.value, self.cache)
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

impl From<Value> for Resolved {
    fn from(value: Value) -> Self {
        Resolved::new(value)
    }
}

/// The arguments a field was queried with, after defaults were applied. An argument that was
/// not supplied is absent, which a resolver can tell apart from an argument explicitly set to
/// null.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldArgs {
    values: HashMap<String, Value>,
}

impl FieldArgs {
    pub fn new(values: HashMap<String, Value>) -> FieldArgs {
        FieldArgs { values }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldArgs, Resolved};
    use crate::engine::cache::{CacheMetadata, MaxAge};
    use crate::engine::value::Value;
    use maplit::hashmap;

    /// Passes if metadata attached to a resolved value accumulates
    #[test]
    fn resolved_cache_metadata() {
        let r = Resolved::new(5)
            .with_cache_metadata(CacheMetadata::new().with_tags(vec!["A"]))
            .with_cache_metadata(
                CacheMetadata::new()
                    .with_tags(vec!["B"])
                    .with_max_age(MaxAge::Seconds(10)),
            );

        assert_eq!(r.value(), &Value::Int64(5));
        assert_eq!(r.cache_metadata().tags().len(), 2);
        assert_eq!(r.cache_metadata().max_age(), MaxAge::Seconds(10));
    }

    /// Passes if an explicit null argument is distinguishable from an absent one
    #[test]
    fn args_absent_and_null() {
        let args = FieldArgs::new(hashmap! {
            "someArg".to_string() => Value::Null,
        });

        assert!(args.contains("someArg"));
        assert_eq!(args.get("someArg"), Some(&Value::Null));
        assert!(!args.contains("other"));
        assert!(args.get("other").is_none());
        assert!(FieldArgs::default().is_empty());
    }
}
