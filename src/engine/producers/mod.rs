//! Data producers are named, parameterised units of work that a [`Produce`] resolver dispatches
//! to. A producer is described by a [`ProducerDefinition`] holding its argument names and a
//! factory, and a fresh instance is created from the resolved argument values for every
//! invocation.
//!
//! [`Produce`]: ../resolvers/struct.Produce.html

use crate::engine::context::ResolveContext;
use crate::engine::resolvers::Resolved;
use crate::engine::value::Value;
use crate::error::Error;
use log::trace;
use std::collections::HashMap;
use std::fmt::Debug;

mod entity;
mod string;

pub use entity::{EntityId, EntityLoad};
pub use string::Uppercase;

/// Trait implemented by producer instances. The arguments of the producer are bound when the
/// instance is created, so resolving only needs the parent value and the request context.
pub trait DataProducer: Debug + Send + Sync {
    fn resolve(&self, parent: &Value, context: &ResolveContext) -> Result<Resolved, Error>;
}

/// Creates a producer instance from its argument values
pub type ProducerFactory = fn(ProducerArgs) -> Result<Box<dyn DataProducer>, Error>;

/// Argument values bound to a producer instance
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProducerArgs {
    values: HashMap<String, Value>,
}

impl ProducerArgs {
    pub fn new(values: HashMap<String, Value>) -> ProducerArgs {
        ProducerArgs { values }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns the non-null value of argument `name`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputItemNotFound`] if the argument is absent or null
    pub fn required(&self, name: &str) -> Result<&Value, Error> {
        match self.values.get(name) {
            Some(v) if !v.is_null() => Ok(v),
            _ => Err(Error::InputItemNotFound {
                name: name.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ProducerArgument {
    name: String,
    required: bool,
}

impl ProducerArgument {
    pub fn new(name: &str, required: bool) -> ProducerArgument {
        ProducerArgument {
            name: name.to_string(),
            required,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn required(&self) -> bool {
        self.required
    }
}

/// Describes a data producer: its name, the arguments it accepts, and how to instantiate it
///
/// # Examples
///
/// ```rust
/// use warpresolver::engine::context::ResolveContext;
/// use warpresolver::engine::producers::{
///     DataProducer, ProducerArgs, ProducerArgument, ProducerDefinition,
/// };
/// use warpresolver::engine::resolvers::Resolved;
/// use warpresolver::engine::value::Value;
/// use warpresolver::Error;
///
/// #[derive(Debug)]
/// struct Constant {
///     value: Value,
/// }
///
/// impl DataProducer for Constant {
///     fn resolve(&self, _parent: &Value, _context: &ResolveContext) -> Result<Resolved, Error> {
///         Ok(Resolved::new(self.value.clone()))
///     }
/// }
///
/// fn constant(args: ProducerArgs) -> Result<Box<dyn DataProducer>, Error> {
///     Ok(Box::new(Constant { value: args.required("value")?.clone() }))
/// }
///
/// let d = ProducerDefinition::new(
///     "constant",
///     vec![ProducerArgument::new("value", true)],
///     constant,
/// );
/// ```
#[derive(Clone, Debug)]
pub struct ProducerDefinition {
    name: String,
    arguments: Vec<ProducerArgument>,
    factory: ProducerFactory,
}

impl ProducerDefinition {
    pub fn new(
        name: &str,
        arguments: Vec<ProducerArgument>,
        factory: ProducerFactory,
    ) -> ProducerDefinition {
        ProducerDefinition {
            name: name.to_string(),
            arguments,
            factory,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &[ProducerArgument] {
        &self.arguments
    }

    pub fn argument(&self, name: &str) -> Option<&ProducerArgument> {
        self.arguments.iter().find(|a| a.name == name)
    }

    pub fn create_instance(&self, args: ProducerArgs) -> Result<Box<dyn DataProducer>, Error> {
        trace!(
            "ProducerDefinition::create_instance called -- name: {}, args: {:#?}",
            self.name,
            args
        );
        (self.factory)(args)
    }
}

/// Registry of data producer definitions, keyed by producer name.
///
/// # Examples
///
/// ```rust
/// use warpresolver::engine::producers::DataProducerManager;
///
/// let producers = DataProducerManager::new();
/// assert!(producers.definition("uppercase").is_ok());
/// assert!(DataProducerManager::empty().definition("uppercase").is_err());
/// ```
#[derive(Clone, Debug)]
pub struct DataProducerManager {
    definitions: HashMap<String, ProducerDefinition>,
}

impl DataProducerManager {
    /// Creates a manager holding the built-in producers: `entity_id`, `entity_load`, and
    /// `uppercase`
    pub fn new() -> DataProducerManager {
        let mut definitions = HashMap::new();
        for d in entity::definitions()
            .into_iter()
            .chain(string::definitions().into_iter())
        {
            definitions.insert(d.name().to_string(), d);
        }

        DataProducerManager { definitions }
    }

    /// Creates a manager with no producers registered
    pub fn empty() -> DataProducerManager {
        DataProducerManager {
            definitions: HashMap::new(),
        }
    }

    /// Registers a producer definition
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigItemDuplicated`] if a producer of the same name is registered
    pub fn register(&mut self, definition: ProducerDefinition) -> Result<(), Error> {
        if self.definitions.contains_key(definition.name()) {
            return Err(Error::ConfigItemDuplicated {
                type_name: definition.name().to_string(),
            });
        }

        self.definitions
            .insert(definition.name().to_string(), definition);
        Ok(())
    }

    /// Returns the definition of the producer `name`
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProducerNotFound`] if no producer of that name is registered
    pub fn definition(&self, name: &str) -> Result<&ProducerDefinition, Error> {
        self.definitions
            .get(name)
            .ok_or_else(|| Error::ProducerNotFound {
                name: name.to_string(),
            })
    }

    pub fn create_instance(
        &self,
        name: &str,
        args: ProducerArgs,
    ) -> Result<Box<dyn DataProducer>, Error> {
        self.definition(name)?.create_instance(args)
    }
}

impl Default for DataProducerManager {
    fn default() -> Self {
        DataProducerManager::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DataProducer, DataProducerManager, ProducerArgs, ProducerArgument, ProducerDefinition,
    };
    use crate::engine::context::ResolveContext;
    use crate::engine::resolvers::{Resolved, ResolverRegistry};
    use crate::engine::value::Value;
    use crate::error::Error;
    use maplit::hashmap;
    use std::sync::Arc;

    #[derive(Debug)]
    struct Echo {
        value: Value,
    }

    impl DataProducer for Echo {
        fn resolve(&self, _parent: &Value, _context: &ResolveContext) -> Result<Resolved, Error> {
            Ok(Resolved::new(self.value.clone()))
        }
    }

    fn echo(args: ProducerArgs) -> Result<Box<dyn DataProducer>, Error> {
        Ok(Box::new(Echo {
            value: args.required("value")?.clone(),
        }))
    }

    fn echo_definition() -> ProducerDefinition {
        ProducerDefinition::new("echo", vec![ProducerArgument::new("value", true)], echo)
    }

    /// Passes if the built-in producers are registered by default
    #[test]
    fn builtins() {
        let m = DataProducerManager::new();

        for name in &["entity_id", "entity_load", "uppercase"] {
            assert!(m.definition(name).is_ok());
        }
        assert!(m.definition("entity_load").unwrap().argument("type").is_some());
        assert!(m.definition("entity_load").unwrap().argument("bundle").is_none());
    }

    /// Passes if an unknown producer is reported
    #[test]
    fn not_found() {
        assert!(matches!(
            DataProducerManager::empty().definition("echo"),
            Err(Error::ProducerNotFound { name }) if name == "echo"
        ));
    }

    /// Passes if registering a producer twice is rejected
    #[test]
    fn register_duplicate() {
        let mut m = DataProducerManager::empty();

        assert!(m.register(echo_definition()).is_ok());
        assert!(matches!(
            m.register(echo_definition()),
            Err(Error::ConfigItemDuplicated { type_name }) if type_name == "echo"
        ));
    }

    /// Passes if an instance is created from argument values and resolves
    #[test]
    fn create_instance() {
        let mut m = DataProducerManager::empty();
        m.register(echo_definition()).unwrap();
        let ctx = ResolveContext::new(Arc::new(ResolverRegistry::new()));

        let p = m
            .create_instance(
                "echo",
                ProducerArgs::new(hashmap! {"value".to_string() => Value::from(3)}),
            )
            .unwrap();
        assert_eq!(
            p.resolve(&Value::Null, &ctx).unwrap().value(),
            &Value::Int64(3)
        );

        assert!(matches!(
            m.create_instance("echo", ProducerArgs::default()),
            Err(Error::InputItemNotFound { name }) if name == "value"
        ));
    }
}
