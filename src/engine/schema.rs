//! This module generates the Juniper root node from a [`Config`], and holds the schema data
//! structures the dynamic GraphQL types use to build their metadata and to dispatch fields.

use super::config::{Config, Field, TypeKind as ConfigTypeKind, SCALAR_NAMES};
use super::context::ResolveContext;
use super::objects::Node;
use super::value::Value;
use crate::error::Error;
use juniper::{EmptyMutation, EmptySubscription, RootNode};
use std::collections::hash_map::Values;
use std::collections::HashMap;
use std::convert::TryFrom;
use std::panic::catch_unwind;
use std::slice::Iter;
use std::sync::Arc;

/// Carries the type information in the GraphQL schema, derived from the [`Config`] used to
/// set up the Warpresolver [`Engine`].
///
/// [`Engine`]: ../struct.Engine.html
#[derive(Clone, Debug, PartialEq)]
pub struct Info {
    name: String,
    type_defs: Arc<HashMap<String, NodeType>>,
}

impl Info {
    pub(crate) fn new(name: String, type_defs: Arc<HashMap<String, NodeType>>) -> Info {
        Info { name, type_defs }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn type_def(&self) -> Result<&NodeType, Error> {
        self.type_def_by_name(&self.name)
    }

    pub(crate) fn type_def_by_name(&self, name: &str) -> Result<&NodeType, Error> {
        self.type_defs
            .get(name)
            .ok_or_else(|| Error::SchemaItemNotFound {
                name: name.to_string(),
            })
    }

    pub(crate) fn type_defs(&self) -> Arc<HashMap<String, NodeType>> {
        self.type_defs.clone()
    }
}

pub(super) type RootRef = Arc<
    RootNode<'static, Node, EmptyMutation<ResolveContext>, EmptySubscription<ResolveContext>>,
>;

#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) enum ArgumentKind {
    Required,
    Optional,
}

#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) enum PropertyKind {
    Input,
    Object,
    Scalar,
}

#[derive(Debug, PartialEq)]
pub(crate) struct NodeType {
    props: HashMap<String, Property>,
    type_name: String,
}

impl NodeType {
    fn new(type_name: String, props: HashMap<String, Property>) -> NodeType {
        NodeType { props, type_name }
    }

    pub(crate) fn property(&self, property_name: &str) -> Result<&Property, Error> {
        self.props
            .get(property_name)
            .ok_or_else(|| Error::SchemaItemNotFound {
                name: self.type_name.to_string() + "::" + property_name,
            })
    }

    pub(crate) fn props(&self) -> Values<'_, String, Property> {
        self.props.values()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Property {
    name: String,
    kind: PropertyKind,
    type_name: String,
    required: bool,
    list: bool,
    arguments: Vec<Argument>,
}

impl Property {
    fn new(name: String, kind: PropertyKind, type_name: String) -> Property {
        Property {
            name,
            kind,
            type_name,
            required: false,
            list: false,
            arguments: Vec::new(),
        }
    }

    pub(crate) fn arguments(&self) -> Iter<'_, Argument> {
        self.arguments.iter()
    }

    pub(crate) fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    pub(crate) fn list(&self) -> bool {
        self.list
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn required(&self) -> bool {
        self.required
    }

    pub(crate) fn type_name(&self) -> &str {
        &self.type_name
    }

    fn with_arguments(mut self, arguments: Vec<Argument>) -> Self {
        self.arguments = arguments;
        self
    }

    fn with_list(mut self, list: bool) -> Self {
        self.list = list;
        self
    }

    fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Argument {
    name: String,
    kind: ArgumentKind,
    type_name: String,
    list: bool,
    default: Option<Value>,
}

impl Argument {
    fn new(name: String, kind: ArgumentKind, type_name: String) -> Argument {
        Argument {
            name,
            kind,
            type_name,
            list: false,
            default: None,
        }
    }

    pub(crate) fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub(crate) fn kind(&self) -> &ArgumentKind {
        &self.kind
    }

    pub(crate) fn list(&self) -> bool {
        self.list
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn type_name(&self) -> &str {
        &self.type_name
    }

    fn with_default(mut self, default: Option<Value>) -> Self {
        self.default = default;
        self
    }

    fn with_list(mut self, list: bool) -> Self {
        self.list = list;
        self
    }
}

fn property_kind(c: &Config, type_name: &str) -> PropertyKind {
    if SCALAR_NAMES.contains(&type_name) {
        PropertyKind::Scalar
    } else {
        match c.type_by_name(type_name).map(|t| t.kind()) {
            Some(ConfigTypeKind::Input) => PropertyKind::Input,
            _ => PropertyKind::Object,
        }
    }
}

/// Takes a configured field and returns the Property the dynamic types resolve it with
fn generate_prop(c: &Config, f: &Field) -> Property {
    let arguments = f
        .arguments()
        .iter()
        .map(|a| {
            let kind = if a.required() {
                ArgumentKind::Required
            } else {
                ArgumentKind::Optional
            };

            // defaults were checked against the argument type by Config::validate
            let default = a
                .default()
                .and_then(|d| Value::try_from(d.clone()).ok());

            Argument::new(a.name().to_string(), kind, a.type_name().to_string())
                .with_list(a.list())
                .with_default(default)
        })
        .collect();

    Property::new(
        f.name().to_string(),
        property_kind(c, f.type_name()),
        f.type_name().to_string(),
    )
    .with_required(f.required())
    .with_list(f.list())
    .with_arguments(arguments)
}

fn generate_schema(c: &Config) -> HashMap<String, NodeType> {
    c.model()
        .iter()
        .map(|t| {
            let props = t
                .fields()
                .iter()
                .map(|f| (f.name().to_string(), generate_prop(c, f)))
                .collect();

            (
                t.name().to_string(),
                NodeType::new(t.name().to_string(), props),
            )
        })
        .collect()
}

/// Takes a Warpresolver configuration and returns the Juniper RootNode for a GraphQL schema
/// that matches the configuration.
///
/// # Errors
///
/// Returns the validation [`Error`] of the configuration if it is not valid, or
/// [`Error::SchemaItemNotFound`] if building the schema metadata fails regardless.
pub(super) fn create_root_node(c: &Config) -> Result<RootRef, Error> {
    c.validate()?;

    let nts = Arc::new(generate_schema(c));
    let root_query_info = Info::new("Query".to_string(), nts);

    catch_unwind(|| {
        Arc::new(RootNode::new_with_info(
            Node::new("Query".to_string(), Value::Null),
            EmptyMutation::new(),
            EmptySubscription::new(),
            root_query_info,
            (),
            (),
        ))
    })
    .map_err(|e| {
        e.downcast::<String>()
            .map(|s| Error::SchemaItemNotFound { name: *s })
            .unwrap_or_else(|e| Error::SchemaItemNotFound {
                name: format!("{:#?}", e),
            })
    })
}

#[cfg(test)]
pub(crate) fn mock_info(c: &Config, name: &str) -> Info {
    Info::new(name.to_string(), Arc::new(generate_schema(c)))
}

#[cfg(test)]
mod tests {
    use super::{create_root_node, generate_schema, ArgumentKind, Info, PropertyKind};
    use crate::engine::config::{
        mock_tree_config, Argument, Config, Field, ServerConfig, Type, TypeKind as ConfigTypeKind,
    };
    use crate::engine::value::Value;
    use crate::error::Error;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// Passes if a new Info struct is created
    #[test]
    fn info_new() {
        let i = Info::new("typename".to_string(), Arc::new(HashMap::new()));

        assert!(i.name() == "typename");
        assert!(matches!(
            i.type_def(),
            Err(Error::SchemaItemNotFound { name }) if name == "typename"
        ));
    }

    /// Passes if the tree config produces the expected schema elements
    #[test]
    fn test_generate_schema() {
        let nts = generate_schema(&mock_tree_config());

        let query = nts.get("Query").unwrap();
        assert_eq!(query.type_name, "Query");
        let tree = query.property("tree").unwrap();
        assert_eq!(tree.kind(), &PropertyKind::Object);
        assert_eq!(tree.type_name(), "Tree");
        assert!(!tree.required());
        assert!(!tree.list());

        let id = nts.get("Tree").unwrap().property("id").unwrap();
        assert_eq!(id.kind(), &PropertyKind::Scalar);
        let args = id.arguments().collect::<Vec<_>>();
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].name(), "someArg");
        assert_eq!(args[0].kind(), &ArgumentKind::Optional);
        assert!(args[0].default().is_none());

        assert!(matches!(
            nts.get("Tree").unwrap().property("height"),
            Err(Error::SchemaItemNotFound { name }) if name == "Tree::height"
        ));
    }

    /// Passes if input types and argument defaults carry over into the schema
    #[test]
    fn test_generate_input_schema() {
        let c = Config::new(
            1,
            ServerConfig::default(),
            vec![
                Type::new(
                    "Query",
                    ConfigTypeKind::Object,
                    vec![Field::new("trees", "String")
                        .with_list(true)
                        .with_arguments(vec![
                            Argument::new("filter", "TreeFilter").with_required(true),
                            Argument::new("limit", "Int").with_default(json!(10)),
                        ])],
                ),
                Type::new(
                    "TreeFilter",
                    ConfigTypeKind::Input,
                    vec![Field::new("name", "String")],
                ),
            ],
        );

        let nts = generate_schema(&c);
        let filter = nts.get("TreeFilter").unwrap();
        assert_eq!(filter.property("name").unwrap().kind(), &PropertyKind::Scalar);

        let trees = nts.get("Query").unwrap().property("trees").unwrap();
        assert!(trees.list());
        let args = trees.arguments().collect::<Vec<_>>();
        assert_eq!(args[0].kind(), &ArgumentKind::Required);
        assert_eq!(args[0].type_name(), "TreeFilter");
        assert_eq!(args[1].default(), Some(&Value::Int64(10)));
    }

    /// Passes if a root node is built for a valid config
    #[test]
    fn root_node_new() {
        assert!(create_root_node(&mock_tree_config()).is_ok());
    }

    /// Passes if an invalid config is refused before the schema is built
    #[test]
    fn root_node_invalid_config() {
        let c = Config::new(1, ServerConfig::default(), Vec::new());

        assert!(matches!(
            create_root_node(&c),
            Err(Error::ConfigTypeNotFound { .. })
        ));
    }
}
