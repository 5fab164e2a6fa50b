//! Contains the dynamic GraphQL types the engine executes queries with. A [`Node`] stands for
//! an object in the response and resolves each of its fields through the resolver registered
//! for the field. `Input` carries input objects and arguments into resolvers.

use super::context::ResolveContext;
use super::resolvers::{FieldArgs, Resolver};
use super::schema::{Argument, ArgumentKind, Info, Property, PropertyKind};
use crate::engine::cache::CacheMetadata;
use crate::engine::value::Value;
use crate::error::Error;
use juniper::meta::{Argument as MetaArgument, Field as MetaField, MetaType};
use juniper::{
    Arguments, DefaultScalarValue, ExecutionResult, Executor, FromInputValue, GraphQLType,
    GraphQLValue, InputValue, Registry, ID,
};
use log::{debug, error, trace};
use std::collections::HashMap;
use std::convert::{TryFrom, TryInto};

#[derive(Clone, Debug)]
struct Input {
    value: Value,
}

impl Input {
    fn new(value: Value) -> Input {
        Input { value }
    }

    fn into_value(self) -> Value {
        self.value
    }
}

impl FromInputValue for Input {
    fn from_input_value(v: &InputValue) -> Option<Self> {
        serde_json::to_value(v)
            .ok()
            .and_then(|val| val.try_into().ok())
            .map(Input::new)
    }
}

impl GraphQLValue for Input {
    type Context = ResolveContext;
    type TypeInfo = Info;

    fn type_name<'i>(&self, info: &'i Self::TypeInfo) -> Option<&'i str> {
        Some(info.name())
    }
}

impl GraphQLType for Input {
    fn name(info: &Self::TypeInfo) -> Option<&str> {
        Some(info.name())
    }

    fn meta<'r>(info: &Self::TypeInfo, registry: &mut Registry<'r>) -> MetaType<'r>
    where
        DefaultScalarValue: 'r,
    {
        trace!("Input::meta called for {}", info.name());

        let nt = info.type_def().unwrap_or_else(|e| {
            // only reachable if the schema was built from an unvalidated config
            error!(
                "Input::meta expected type '{}' that was not found in GraphQL schema",
                info.name()
            );
            panic!("{}", e)
        });

        let mut props = nt.props().collect::<Vec<&Property>>();
        props.sort_by_key(|p| p.name());

        let args = props
            .iter()
            .map(|p| input_meta(p.name(), p.type_name(), p.required(), p.list(), info, registry))
            .collect::<Vec<_>>();

        registry
            .build_input_object_type::<Input>(info, &args)
            .into_meta()
    }
}

/// Returns the metadata of an argument or input object field
fn input_meta<'r>(
    name: &str,
    type_name: &str,
    required: bool,
    list: bool,
    info: &Info,
    registry: &mut Registry<'r>,
) -> MetaArgument<'r, DefaultScalarValue> {
    match (type_name, required, list) {
        ("Boolean", false, false) => registry.arg::<Option<bool>>(name, &()),
        ("Boolean", false, true) => registry.arg::<Option<Vec<bool>>>(name, &()),
        ("Boolean", true, false) => registry.arg::<bool>(name, &()),
        ("Boolean", true, true) => registry.arg::<Vec<bool>>(name, &()),
        ("Float", false, false) => registry.arg::<Option<f64>>(name, &()),
        ("Float", false, true) => registry.arg::<Option<Vec<f64>>>(name, &()),
        ("Float", true, false) => registry.arg::<f64>(name, &()),
        ("Float", true, true) => registry.arg::<Vec<f64>>(name, &()),
        ("ID", false, false) => registry.arg::<Option<ID>>(name, &()),
        ("ID", false, true) => registry.arg::<Option<Vec<ID>>>(name, &()),
        ("ID", true, false) => registry.arg::<ID>(name, &()),
        ("ID", true, true) => registry.arg::<Vec<ID>>(name, &()),
        ("Int", false, false) => registry.arg::<Option<i32>>(name, &()),
        ("Int", false, true) => registry.arg::<Option<Vec<i32>>>(name, &()),
        ("Int", true, false) => registry.arg::<i32>(name, &()),
        ("Int", true, true) => registry.arg::<Vec<i32>>(name, &()),
        ("String", false, false) => registry.arg::<Option<String>>(name, &()),
        ("String", false, true) => registry.arg::<Option<Vec<String>>>(name, &()),
        ("String", true, false) => registry.arg::<String>(name, &()),
        ("String", true, true) => registry.arg::<Vec<String>>(name, &()),
        (_, false, false) => registry.arg::<Option<Input>>(
            name,
            &Info::new(type_name.to_string(), info.type_defs()),
        ),
        (_, false, true) => registry.arg::<Option<Vec<Input>>>(
            name,
            &Info::new(type_name.to_string(), info.type_defs()),
        ),
        (_, true, false) => {
            registry.arg::<Input>(name, &Info::new(type_name.to_string(), info.type_defs()))
        }
        (_, true, true) => registry.arg::<Vec<Input>>(
            name,
            &Info::new(type_name.to_string(), info.type_defs()),
        ),
    }
}

/// Returns the metadata of a field argument. Arguments with a default are declared nullable,
/// and the engine injects the default when the argument is omitted.
fn argument_meta<'r>(
    arg: &Argument,
    info: &Info,
    registry: &mut Registry<'r>,
) -> MetaArgument<'r, DefaultScalarValue> {
    let name = arg.name();
    let with_default = match (arg.type_name(), arg.default()) {
        ("Boolean", Some(Value::Bool(b))) => {
            Some(registry.arg_with_default::<Option<bool>>(name, &Some(*b), &()))
        }
        ("Float", Some(d)) => f64::try_from(d.clone())
            .ok()
            .map(|f| registry.arg_with_default::<Option<f64>>(name, &Some(f), &())),
        ("ID", Some(Value::String(s))) => Some(registry.arg_with_default::<Option<ID>>(
            name,
            &Some(ID::from(s.clone())),
            &(),
        )),
        ("Int", Some(d)) => i32::try_from(d.clone())
            .ok()
            .map(|i| registry.arg_with_default::<Option<i32>>(name, &Some(i), &())),
        ("String", Some(Value::String(s))) => {
            Some(registry.arg_with_default::<Option<String>>(name, &Some(s.clone()), &()))
        }
        _ => None,
    };

    match with_default {
        Some(meta) => meta,
        None => input_meta(
            name,
            arg.type_name(),
            *arg.kind() == ArgumentKind::Required,
            arg.list(),
            info,
            registry,
        ),
    }
}

/// Collects the declared arguments the field was queried with
fn field_args(p: &Property, args: &Arguments) -> FieldArgs {
    FieldArgs::new(
        p.arguments()
            .filter_map(|a| {
                args.get::<Input>(a.name())
                    .map(|input| (a.name().to_string(), input.into_value()))
            })
            .collect::<HashMap<String, Value>>(),
    )
}

fn scalar_output(p: &Property, value: Value) -> Result<juniper::Value, Error> {
    match (value, p.list()) {
        (Value::Null, _) => Ok(juniper::Value::null()),
        (Value::Array(items), true) => items
            .into_iter()
            .map(|v| scalar_item_output(p.type_name(), v))
            .collect::<Result<Vec<_>, Error>>()
            .map(juniper::Value::list),
        (v, true) => Err(Error::TypeConversionFailed {
            src: v.variant_name().to_string(),
            dst: format!("[{}]", p.type_name()),
        }),
        (v, false) => scalar_item_output(p.type_name(), v),
    }
}

fn scalar_item_output(type_name: &str, value: Value) -> Result<juniper::Value, Error> {
    if value.is_null() {
        return Ok(juniper::Value::null());
    }

    match type_name {
        "Boolean" => Ok(juniper::Value::scalar(bool::try_from(value)?)),
        "Float" => Ok(juniper::Value::scalar(f64::try_from(value)?)),
        "ID" | "String" => Ok(juniper::Value::scalar(String::try_from(value)?)),
        "Int" => Ok(juniper::Value::scalar(i32::try_from(value)?)),
        _ => Err(Error::TypeConversionFailed {
            src: value.variant_name().to_string(),
            dst: type_name.to_string(),
        }),
    }
}

/// An object in the GraphQL response. The node carries the value its parent field resolved to,
/// which the resolvers of the node's own fields receive as their parent value.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    typename: String,
    parent: Value,
}

impl Node {
    pub(crate) fn new(typename: String, parent: Value) -> Node {
        Node { typename, parent }
    }

    fn field_meta<'r>(
        p: &Property,
        info: &Info,
        registry: &mut Registry<'r>,
    ) -> MetaField<'r, DefaultScalarValue> {
        let f = match (p.type_name(), p.required(), p.list()) {
            ("Boolean", false, false) => registry.field::<Option<bool>>(p.name(), &()),
            ("Boolean", false, true) => registry.field::<Option<Vec<bool>>>(p.name(), &()),
            ("Boolean", true, false) => registry.field::<bool>(p.name(), &()),
            ("Boolean", true, true) => registry.field::<Vec<bool>>(p.name(), &()),
            ("Float", false, false) => registry.field::<Option<f64>>(p.name(), &()),
            ("Float", false, true) => registry.field::<Option<Vec<f64>>>(p.name(), &()),
            ("Float", true, false) => registry.field::<f64>(p.name(), &()),
            ("Float", true, true) => registry.field::<Vec<f64>>(p.name(), &()),
            ("ID", false, false) => registry.field::<Option<ID>>(p.name(), &()),
            ("ID", false, true) => registry.field::<Option<Vec<ID>>>(p.name(), &()),
            ("ID", true, false) => registry.field::<ID>(p.name(), &()),
            ("ID", true, true) => registry.field::<Vec<ID>>(p.name(), &()),
            ("Int", false, false) => registry.field::<Option<i32>>(p.name(), &()),
            ("Int", false, true) => registry.field::<Option<Vec<i32>>>(p.name(), &()),
            ("Int", true, false) => registry.field::<i32>(p.name(), &()),
            ("Int", true, true) => registry.field::<Vec<i32>>(p.name(), &()),
            ("String", false, false) => registry.field::<Option<String>>(p.name(), &()),
            ("String", false, true) => registry.field::<Option<Vec<String>>>(p.name(), &()),
            ("String", true, false) => registry.field::<String>(p.name(), &()),
            ("String", true, true) => registry.field::<Vec<String>>(p.name(), &()),
            (_, false, false) => registry.field::<Option<Node>>(
                p.name(),
                &Info::new(p.type_name().to_string(), info.type_defs()),
            ),
            (_, false, true) => registry.field::<Option<Vec<Node>>>(
                p.name(),
                &Info::new(p.type_name().to_string(), info.type_defs()),
            ),
            (_, true, false) => registry.field::<Node>(
                p.name(),
                &Info::new(p.type_name().to_string(), info.type_defs()),
            ),
            (_, true, true) => registry.field::<Vec<Node>>(
                p.name(),
                &Info::new(p.type_name().to_string(), info.type_defs()),
            ),
        };

        p.arguments()
            .fold(f, |f, arg| f.argument(argument_meta(arg, info, registry)))
    }

    fn resolve_object(
        p: &Property,
        value: Value,
        cache: &CacheMetadata,
        info: &Info,
        executor: &Executor<ResolveContext>,
    ) -> ExecutionResult {
        let child_info = Info::new(p.type_name().to_string(), info.type_defs());

        match (value, p.list()) {
            (Value::Null, _) => {
                executor.context().add_cache_metadata(cache);
                Ok(juniper::Value::null())
            }
            (Value::Array(items), true) => {
                let nodes = items
                    .into_iter()
                    .map(|v| Node::new(p.type_name().to_string(), v))
                    .collect::<Vec<Node>>();
                executor.context().add_cache_metadata(cache);
                executor.resolve(&child_info, &nodes)
            }
            (v, true) => Err(Error::TypeConversionFailed {
                src: v.variant_name().to_string(),
                dst: format!("[{}]", p.type_name()),
            }
            .into()),
            (v, false) => {
                executor.context().add_cache_metadata(cache);
                executor.resolve(&child_info, &Node::new(p.type_name().to_string(), v))
            }
        }
    }
}

impl GraphQLValue for Node {
    type Context = ResolveContext;
    type TypeInfo = Info;

    fn type_name<'i>(&self, info: &'i Self::TypeInfo) -> Option<&'i str> {
        Some(info.name())
    }

    fn concrete_type_name(&self, _context: &Self::Context, _info: &Self::TypeInfo) -> String {
        self.typename.clone()
    }

    fn resolve_field(
        &self,
        info: &Self::TypeInfo,
        field_name: &str,
        args: &Arguments,
        executor: &Executor<Self::Context>,
    ) -> ExecutionResult {
        trace!(
            "Node::resolve_field called -- type: {}, field_name: {}",
            info.name(),
            field_name,
        );
        let context = executor.context();
        context.check_deadline()?;

        let p = info.type_def()?.property(field_name)?;
        let resolved = context
            .registry()
            .field_resolver(info.name(), field_name)
            .resolve(&self.parent, &field_args(p, args), context)
            .map_err(|e| {
                debug!(
                    "Node::resolve_field -- {}::{} failed: {}",
                    info.name(),
                    field_name,
                    e
                );
                e
            })?;
        let (value, cache) = resolved.into_parts();

        // a field that fails to convert contributes no cache metadata
        match p.kind() {
            PropertyKind::Scalar => {
                let output = scalar_output(p, value)?;
                context.add_cache_metadata(&cache);
                Ok(output)
            }
            PropertyKind::Object => Node::resolve_object(p, value, &cache, info, executor),
            PropertyKind::Input => Err(Error::SchemaItemNotFound {
                name: info.name().to_string() + "::" + field_name,
            }
            .into()),
        }
    }
}

impl GraphQLType for Node {
    fn name(info: &Self::TypeInfo) -> Option<&str> {
        Some(info.name())
    }

    fn meta<'r>(info: &Self::TypeInfo, registry: &mut Registry<'r>) -> MetaType<'r>
    where
        DefaultScalarValue: 'r,
    {
        trace!("Node::meta called -- info.name: {}", info.name());
        let nt = info.type_def().unwrap_or_else(|e| {
            error!("Node::meta panicking on type: {}", info.name());
            panic!("{}", e)
        });

        let mut props = nt.props().collect::<Vec<&Property>>();
        props.sort_by_key(|&p| p.name());

        let fields = props
            .iter()
            .map(|p| Node::field_meta(p, info, registry))
            .collect::<Vec<_>>();

        registry.build_object_type::<Node>(info, &fields).into_meta()
    }
}
