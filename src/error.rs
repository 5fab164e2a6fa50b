//! Provides the [`Error`] type for Warpresolver

use std::fmt::{Display, Formatter};

/// Error type for Warpresolver
///
/// # Examples
///
/// ```rust
/// use warpresolver::Error;
///
/// let e = Error::ProducerNotFound { name: "entity_load".to_string() };
/// ```
#[derive(Debug)]
pub enum Error {
    /// Returned if two types in a configuration, two fields on a type, or two data producers
    /// are defined with the same name. The `type_name` field contains the duplicated name.
    ConfigItemDuplicated { type_name: String },

    /// Returned if a type is defined with a name that is a reserved word, such as "ID" or a
    /// GraphQL scalar. The field `type_name` is the name that triggered the error.
    ConfigItemReserved { type_name: String },

    /// Returned if a `Config` file cannot be opened, typically because the configuration file
    /// cannot be found on disk
    ConfigOpenFailed { source: std::io::Error },

    /// Returned if a field or argument refers to a type that is neither a GraphQL scalar nor a
    /// type defined in the configuration, or if the configuration has no `Query` type. The
    /// `type_name` field holds the missing type.
    ConfigTypeNotFound { type_name: String },

    /// Returned if an argument default in the configuration does not match the declared type
    /// of the argument. The `name` field holds the argument name.
    ConfigDefaultInvalid { name: String },

    /// Returned if a path resolver is constructed for a data type that is known to the typed
    /// data manager but is not a complex (map-shaped) type.
    DataDefinitionNotComplex { data_type: String },

    /// Returned if the typed data manager has no definition for the requested data type.
    DataDefinitionNotFound { data_type: String },

    /// Returned if a `Config` fails to deserialize because the provided data does not match the
    /// expected data structure
    DeserializationFailed { source: serde_yaml::Error },

    /// Returned for every field resolved after the request deadline configured for the server
    /// has passed.
    ExecutionTimedOut,

    /// Returned if a data producer is instantiated without an argument it cannot do without.
    /// The `name` field holds the argument name.
    InputItemNotFound { name: String },

    /// Returned if a path expression handed to a path resolver is empty or contains an empty
    /// segment, such as `path..uri`.
    PathExpressionInvalid { path: String },

    /// Returned if a producer resolver maps a value onto an argument the producer does not
    /// declare.
    ProducerArgumentNotFound { producer: String, argument: String },

    /// Returned if a resolver is built for a data producer name that has not been registered.
    /// The `name` field contains the name of the producer that could not be found.
    ProducerNotFound { name: String },

    /// Returned if a resolver callback fails for a reason outside of the framework's control.
    ResolverFailed {
        source: Box<dyn std::error::Error + Sync + Send>,
    },

    /// Returned if Warpresolver fails to find an element within a schema, such as a type or
    /// field. Also returned when building an engine whose registry holds resolvers for fields
    /// that the schema does not define. The field is the name of the schema element.
    SchemaItemNotFound { name: String },

    /// Returned if a GraphQL response cannot be converted to a serde_json::Value
    SerializationFailed { source: serde_json::Error },

    /// Returned if the entity storage back-end fails to load data
    StorageFailed {
        source: Box<dyn std::error::Error + Sync + Send>,
    },

    /// Returned if a resolver needs the entity storage, but the engine was built without one.
    StorageNotFound,

    /// Values are transformed between the GraphQL input, the resolver, and the GraphQL output
    /// representations in the course of resolving a field. If data fails to convert
    /// successfully, this error is returned. The `src` field contains the source type name or
    /// value that could not be converted.
    TypeConversionFailed { src: String, dst: String },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Error::ConfigItemDuplicated { type_name } => {
                write!(f, "Config model contains duplicate item: {}", type_name)
            }
            Error::ConfigItemReserved { type_name } => {
                write!(f, "Config item cannot use a reserved word as a name: {}", type_name)
            }
            Error::ConfigOpenFailed { source } => {
                write!(f, "Config file could not be opened. Source error: {}", source)
            }
            Error::ConfigTypeNotFound { type_name } => {
                write!(f, "Config refers to a type that is not defined: {}", type_name)
            }
            Error::ConfigDefaultInvalid { name } => {
                write!(f, "Default value does not match the type of argument {}", name)
            }
            Error::DataDefinitionNotComplex { data_type } => {
                write!(
                    f,
                    "Data type {} is not a complex data type and cannot be traversed",
                    data_type
                )
            }
            Error::DataDefinitionNotFound { data_type } => {
                write!(f, "Could not find a data definition for data type {}", data_type)
            }
            Error::DeserializationFailed { source } => {
                write!(f, "Failed to deserialize configuration. Source error: {}", source)
            }
            Error::ExecutionTimedOut => {
                write!(f, "Query execution exceeded the time allowed for the request.")
            }
            Error::InputItemNotFound { name } => {
                write!(f, "Could not find an expected argument, {}.", name)
            }
            Error::PathExpressionInvalid { path } => {
                write!(f, "Invalid path expression: '{}'", path)
            }
            Error::ProducerArgumentNotFound { producer, argument } => {
                write!(f, "Data producer {} has no argument named {}", producer, argument)
            }
            Error::ProducerNotFound { name } => {
                write!(f, "Could not find a data producer named {}", name)
            }
            Error::ResolverFailed { source } => {
                write!(f, "Resolver returned an error: {}", source)
            }
            Error::SchemaItemNotFound { name } => {
                write!(f, "The following item could not be found in the schema: {}", name)
            }
            Error::SerializationFailed { source } => {
                write!(f, "Serialization of the GraphQL response failed. Source error: {}", source)
            }
            Error::StorageFailed { source } => {
                write!(f, "Entity storage returned an error: {}", source)
            }
            Error::StorageNotFound => {
                write!(f, "Use of this resolver requires an entity storage back-end.")
            }
            Error::TypeConversionFailed { src, dst } => {
                write!(f, "The type or value {} could not be converted to type {}", src, dst)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ConfigOpenFailed { source } => Some(source),
            Error::DeserializationFailed { source } => Some(source),
            Error::ResolverFailed { source } => Some(source.as_ref()),
            Error::SerializationFailed { source } => Some(source),
            Error::StorageFailed { source } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::DeserializationFailed { source: e }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::ConfigOpenFailed { source: e }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerializationFailed { source: e }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    /// Passes if a new error with no wrapped source error is created
    #[test]
    fn new_error() {
        let e = Error::StorageNotFound;

        assert!(std::error::Error::source(&e).is_none());
    }

    /// Passes if an error prints a display string correctly
    #[test]
    fn display_fmt() {
        let s = std::io::Error::new(std::io::ErrorKind::Other, "oh no!");
        let e = Error::ConfigOpenFailed { source: s };

        assert_eq!(
            "Config file could not be opened. Source error: oh no!",
            &format!("{}", e)
        );
    }

    /// Passes if a wrapped storage error is reachable as the source
    #[test]
    fn storage_source() {
        let s = std::io::Error::new(std::io::ErrorKind::Other, "unreachable");
        let e = Error::StorageFailed {
            source: Box::new(s),
        };

        assert!(std::error::Error::source(&e).is_some());
        assert_eq!(
            "Entity storage returned an error: unreachable",
            &format!("{}", e)
        );
    }

    /// Passes if Error implements the Send trait
    #[test]
    fn test_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Error>();
    }

    /// Passes if Error implements the Sync trait
    #[test]
    fn test_sync() {
        fn assert_sync<T: Sync>() {}
        assert_sync::<Error>();
    }
}
