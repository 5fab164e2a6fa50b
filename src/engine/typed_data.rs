//! Typed views over resolver values. A path resolver wraps the value it traverses in a
//! [`TypedData`] built from a [`DataDefinition`], and walks the path one property at a time.

use crate::engine::value::Value;
use crate::error::Error;
use log::trace;
use std::collections::HashMap;
use std::fmt::Debug;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DataKind {
    /// Map-shaped data with named properties
    Complex,
    /// Ordered items, addressed by index
    List,
    Primitive,
    /// Data of unknown shape, traversed as whatever it turns out to be
    Any,
}

/// Describes the shape of a data type: whether it is complex, a list, or a primitive, and the
/// definitions of its properties or items.
///
/// A complex definition with no declared properties accepts any property present in the data.
/// Once properties are declared, only those are traversable.
///
/// # Examples
///
/// ```rust
/// use warpresolver::engine::typed_data::DataDefinition;
///
/// let d = DataDefinition::complex("tree")
///     .with_property("path", DataDefinition::complex("path")
///         .with_property("uri", DataDefinition::primitive("string")));
///
/// assert!(d.is_complex());
/// assert!(d.property("path").is_some());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DataDefinition {
    data_type: String,
    kind: DataKind,
    properties: HashMap<String, DataDefinition>,
    item: Option<Box<DataDefinition>>,
}

impl DataDefinition {
    fn new(data_type: &str, kind: DataKind) -> DataDefinition {
        DataDefinition {
            data_type: data_type.to_string(),
            kind,
            properties: HashMap::new(),
            item: None,
        }
    }

    pub fn complex(data_type: &str) -> DataDefinition {
        DataDefinition::new(data_type, DataKind::Complex)
    }

    pub fn primitive(data_type: &str) -> DataDefinition {
        DataDefinition::new(data_type, DataKind::Primitive)
    }

    pub fn list(data_type: &str, item: DataDefinition) -> DataDefinition {
        let mut d = DataDefinition::new(data_type, DataKind::List);
        d.item = Some(Box::new(item));
        d
    }

    pub fn any() -> DataDefinition {
        DataDefinition::new("any", DataKind::Any)
    }

    pub fn with_property(mut self, name: &str, definition: DataDefinition) -> Self {
        self.properties.insert(name.to_string(), definition);
        self
    }

    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    pub fn kind(&self) -> DataKind {
        self.kind
    }

    pub fn is_complex(&self) -> bool {
        self.kind == DataKind::Complex
    }

    pub fn property(&self, name: &str) -> Option<&DataDefinition> {
        self.properties.get(name)
    }

    pub fn item(&self) -> Option<&DataDefinition> {
        self.item.as_deref()
    }

    fn child(&self, name: &str) -> Option<DataDefinition> {
        match self.kind {
            DataKind::Complex if self.properties.is_empty() => Some(DataDefinition::any()),
            DataKind::Complex => self.property(name).cloned(),
            DataKind::List => Some(self.item().cloned().unwrap_or_else(DataDefinition::any)),
            DataKind::Any => Some(DataDefinition::any()),
            DataKind::Primitive => None,
        }
    }
}

/// A value paired with the definition that describes it
pub trait TypedData: Debug {
    fn definition(&self) -> &DataDefinition;

    /// Returns the property `name`, or for lists the item at index `name`. Returns `None` if
    /// the definition does not allow the property or the value does not contain it.
    fn get(&self, name: &str) -> Option<Box<dyn TypedData>>;

    fn value(&self) -> Value;
}

/// Trait implemented by the registry of data definitions the path resolvers consult
pub trait TypedDataManager: Debug + Send + Sync {
    /// Returns the definition of `data_type`
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataDefinitionNotFound`] if the data type is unknown
    fn definition(&self, data_type: &str) -> Result<DataDefinition, Error>;

    /// Wraps `value` as typed data described by `definition`
    fn create(&self, definition: &DataDefinition, value: Value)
        -> Result<Box<dyn TypedData>, Error>;
}

/// A [`TypedDataManager`] holding definitions registered by name
///
/// # Examples
///
/// ```rust
/// use warpresolver::engine::typed_data::{DataDefinition, DefinitionManager, TypedDataManager};
///
/// let manager = DefinitionManager::new().with_definition(DataDefinition::complex("tree"));
///
/// assert!(manager.definition("tree").is_ok());
/// assert!(manager.definition("forest").is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct DefinitionManager {
    definitions: HashMap<String, DataDefinition>,
}

impl DefinitionManager {
    pub fn new() -> DefinitionManager {
        DefinitionManager::default()
    }

    /// Registers a definition under its data type, returning the definition it replaces
    pub fn register(&mut self, definition: DataDefinition) -> Option<DataDefinition> {
        self.definitions
            .insert(definition.data_type().to_string(), definition)
    }

    pub fn with_definition(mut self, definition: DataDefinition) -> Self {
        self.register(definition);
        self
    }
}

impl TypedDataManager for DefinitionManager {
    fn definition(&self, data_type: &str) -> Result<DataDefinition, Error> {
        self.definitions
            .get(data_type)
            .cloned()
            .ok_or_else(|| Error::DataDefinitionNotFound {
                data_type: data_type.to_string(),
            })
    }

    fn create(
        &self,
        definition: &DataDefinition,
        value: Value,
    ) -> Result<Box<dyn TypedData>, Error> {
        Ok(Box::new(TypedValue::new(definition.clone(), value)))
    }
}

/// The [`TypedData`] created by [`DefinitionManager`]
#[derive(Clone, Debug, PartialEq)]
pub struct TypedValue {
    definition: DataDefinition,
    value: Value,
}

impl TypedValue {
    pub fn new(definition: DataDefinition, value: Value) -> TypedValue {
        TypedValue { definition, value }
    }
}

impl TypedData for TypedValue {
    fn definition(&self) -> &DataDefinition {
        &self.definition
    }

    fn get(&self, name: &str) -> Option<Box<dyn TypedData>> {
        trace!(
            "TypedValue::get called -- data_type: {}, name: {}",
            self.definition.data_type(),
            name
        );
        let definition = self.definition.child(name)?;

        let child = match &self.value {
            Value::Map(m) => m.get(name),
            Value::Array(a) => name.parse::<usize>().ok().and_then(|i| a.get(i)),
            _ => None,
        }?;

        Some(Box::new(TypedValue::new(definition, child.clone())))
    }

    fn value(&self) -> Value {
        self.value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::{DataDefinition, DataKind, DefinitionManager, TypedDataManager};
    use crate::engine::value::Value;
    use crate::error::Error;
    use serde_json::json;
    use std::convert::TryInto;

    fn manager() -> DefinitionManager {
        DefinitionManager::new().with_definition(
            DataDefinition::complex("tree")
                .with_property(
                    "path",
                    DataDefinition::complex("path")
                        .with_property("uri", DataDefinition::primitive("string")),
                )
                .with_property(
                    "branches",
                    DataDefinition::list("branches", DataDefinition::complex("branch")),
                ),
        )
    }

    /// Passes if an unknown data type is reported
    #[test]
    fn definition_not_found() {
        assert!(matches!(
            manager().definition("forest"),
            Err(Error::DataDefinitionNotFound { data_type }) if data_type == "forest"
        ));
    }

    /// Passes if declared properties are traversed
    #[test]
    fn traverse_declared() {
        let m = manager();
        let v: Value = json!({"path": {"uri": "<front>"}}).try_into().unwrap();
        let data = m.create(&m.definition("tree").unwrap(), v).unwrap();

        let uri = data.get("path").and_then(|p| p.get("uri")).unwrap();
        assert_eq!(uri.value(), Value::from("<front>"));
        assert_eq!(uri.definition().kind(), DataKind::Primitive);
    }

    /// Passes if undeclared and missing properties are not traversable
    #[test]
    fn traverse_missing() {
        let m = manager();
        let v: Value = json!({"path": {}, "height": 5}).try_into().unwrap();
        let data = m.create(&m.definition("tree").unwrap(), v).unwrap();

        assert!(data.get("path").unwrap().get("uri").is_none());
        assert!(data.get("height").is_none());
        assert!(data.get("path").is_some());
    }

    /// Passes if list items are addressed by index
    #[test]
    fn traverse_list() {
        let m = manager();
        let v: Value = json!({"branches": [{"length": 1}, {"length": 2}]})
            .try_into()
            .unwrap();
        let data = m.create(&m.definition("tree").unwrap(), v).unwrap();

        let second = data.get("branches").and_then(|b| b.get("1")).unwrap();
        assert_eq!(second.definition().data_type(), "branch");
        assert_eq!(
            second.get("length").map(|l| l.value()),
            Some(Value::Int64(2))
        );
        assert!(data.get("branches").unwrap().get("2").is_none());
    }

    /// Passes if primitives have no properties
    #[test]
    fn primitive_leaf() {
        let m = DefinitionManager::new();
        let data = m
            .create(&DataDefinition::primitive("string"), Value::from("x"))
            .unwrap();

        assert!(data.get("anything").is_none());
    }
}
