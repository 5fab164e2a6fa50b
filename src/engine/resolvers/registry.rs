use super::{FieldArgs, Resolved, Resolver};
use crate::engine::context::ResolveContext;
use crate::engine::value::Value;
use crate::error::Error;
use log::{trace, warn};
use std::collections::HashMap;

/// Maps (type name, field name) pairs onto the resolvers that compute them. Fields without a
/// registered resolver fall back to a [`PropertyResolver`] reading the property of the same name
/// from the parent value.
///
/// The registry is populated before the engine is built and read-only afterwards.
///
/// # Examples
///
/// ```rust
/// use warpresolver::engine::resolvers::{ResolverBuilder, ResolverRegistry};
///
/// let builder = ResolverBuilder::new();
/// let mut registry = ResolverRegistry::new();
/// registry.add_field_resolver("Query", "me", builder.from_value("Some string value"));
///
/// assert!(registry.has_field_resolver("Query", "me"));
/// ```
#[derive(Debug, Default)]
pub struct ResolverRegistry {
    field_resolvers: HashMap<String, HashMap<String, Box<dyn Resolver>>>,
}

impl ResolverRegistry {
    pub fn new() -> ResolverRegistry {
        ResolverRegistry::default()
    }

    /// Registers `resolver` for `field_name` on `type_name`. A later registration for the same
    /// field replaces the earlier one, which is returned.
    pub fn add_field_resolver<R>(
        &mut self,
        type_name: &str,
        field_name: &str,
        resolver: R,
    ) -> Option<Box<dyn Resolver>>
    where
        R: Resolver + 'static,
    {
        trace!(
            "ResolverRegistry::add_field_resolver called -- type_name: {}, field_name: {}",
            type_name,
            field_name
        );
        let previous = self
            .field_resolvers
            .entry(type_name.to_string())
            .or_insert_with(HashMap::new)
            .insert(field_name.to_string(), Box::new(resolver));

        if previous.is_some() {
            warn!(
                "Replacing the resolver registered for {}::{}",
                type_name, field_name
            );
        }

        previous
    }

    /// Builder-style variant of [`add_field_resolver`]
    ///
    /// [`add_field_resolver`]: #method.add_field_resolver
    pub fn with_field_resolver<R>(mut self, type_name: &str, field_name: &str, resolver: R) -> Self
    where
        R: Resolver + 'static,
    {
        self.add_field_resolver(type_name, field_name, resolver);
        self
    }

    /// Returns the resolver registered for the field, or the default property resolver
    pub fn field_resolver(&self, type_name: &str, field_name: &str) -> FieldResolver<'_> {
        match self
            .field_resolvers
            .get(type_name)
            .and_then(|fields| fields.get(field_name))
        {
            Some(r) => FieldResolver::Registered(r.as_ref()),
            None => FieldResolver::Default(PropertyResolver::new(field_name)),
        }
    }

    pub fn has_field_resolver(&self, type_name: &str, field_name: &str) -> bool {
        self.field_resolvers
            .get(type_name)
            .map_or(false, |fields| fields.contains_key(field_name))
    }

    /// Returns the (type name, field name) pairs that have a registered resolver
    pub fn field_keys(&self) -> impl Iterator<Item = (&str, &str)> {
        self.field_resolvers.iter().flat_map(|(type_name, fields)| {
            fields
                .keys()
                .map(move |field_name| (type_name.as_str(), field_name.as_str()))
        })
    }
}

/// The resolver looked up for a field
#[derive(Debug)]
pub enum FieldResolver<'a> {
    Registered(&'a dyn Resolver),
    Default(PropertyResolver),
}

impl FieldResolver<'_> {
    pub fn is_default(&self) -> bool {
        matches!(self, FieldResolver::Default(_))
    }
}

impl Resolver for FieldResolver<'_> {
    fn resolve(
        &self,
        parent: &Value,
        args: &FieldArgs,
        context: &ResolveContext,
    ) -> Result<Resolved, Error> {
        match self {
            FieldResolver::Registered(r) => r.resolve(parent, args, context),
            FieldResolver::Default(r) => r.resolve(parent, args, context),
        }
    }
}

/// Reads the property of the field's own name from a map-shaped parent. Resolves to null for
/// any other parent, or if the property is missing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropertyResolver {
    property: String,
}

impl PropertyResolver {
    pub fn new(property: &str) -> PropertyResolver {
        PropertyResolver {
            property: property.to_string(),
        }
    }
}

impl Resolver for PropertyResolver {
    fn resolve(
        &self,
        parent: &Value,
        _args: &FieldArgs,
        _context: &ResolveContext,
    ) -> Result<Resolved, Error> {
        Ok(Resolved::new(
            parent.get(&self.property).cloned().unwrap_or_default(),
        ))
    }
}
