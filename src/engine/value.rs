//! The dynamic value passed from resolver to resolver while a query executes.

use crate::Error;
use std::collections::HashMap;
use std::convert::{TryFrom, TryInto};

/// A value produced or consumed by a resolver. Resolvers hand values to their children as the
/// parent value, and the engine converts the value of each field into GraphQL output according
/// to the declared type of the field.
///
/// # Examples
///
/// ```rust
/// use std::collections::HashMap;
/// use warpresolver::engine::value::Value;
///
/// let mut tree = HashMap::new();
/// tree.insert("id".to_string(), Value::from(5));
///
/// let v = Value::Map(tree);
/// assert_eq!(v.get("id"), Some(&Value::Int64(5)));
/// ```
#[derive(Clone, Debug)]
pub enum Value {
    Array(Vec<Value>),
    Bool(bool),
    Float64(f64),
    Int64(i64),
    Map(HashMap<String, Value>),
    Null,
    String(String),
    UInt64(u64),
}

impl Value {
    /// Returns the property `name` if the value is a map containing it
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Map(m) => m.get(name),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the value as a string slice, if it is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn variant_name(&self) -> &'static str {
        match self {
            Value::Array(_) => "Value::Array",
            Value::Bool(_) => "Value::Bool",
            Value::Float64(_) => "Value::Float64",
            Value::Int64(_) => "Value::Int64",
            Value::Map(_) => "Value::Map",
            Value::Null => "Value::Null",
            Value::String(_) => "Value::String",
            Value::UInt64(_) => "Value::UInt64",
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(map: HashMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float64(f)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int64(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int64(i)
    }
}

impl From<u64> for Value {
    fn from(i: u64) -> Self {
        Value::UInt64(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(o: Option<T>) -> Self {
        o.map_or(Value::Null, Into::into)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Array(a), Value::Array(oa)) => a == oa,
            (Value::Bool(b), Value::Bool(ob)) => b == ob,
            (Value::Float64(f), Value::Float64(of)) => f == of,
            (Value::Int64(i), Value::Int64(oi)) => i == oi,
            (Value::Map(m), Value::Map(om)) => m == om,
            (Value::Null, Value::Null) => true,
            (Value::String(s), Value::String(os)) => s == os,
            (Value::UInt64(i), Value::UInt64(oi)) => i == oi,
            (_, _) => false,
        }
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Value, Error> {
        match value {
            serde_json::Value::Array(a) => {
                let mut v = Vec::new();
                for val in a {
                    v.push(val.try_into()?);
                }
                Ok(Value::Array(v))
            }
            serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Int64(i))
                } else if let Some(i) = n.as_u64() {
                    Ok(Value::UInt64(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Value::Float64(f))
                } else {
                    Err(Error::TypeConversionFailed {
                        src: "serde_json::Value::Number".to_string(),
                        dst: "Value".to_string(),
                    })
                }
            }
            serde_json::Value::String(s) => Ok(Value::String(s)),
            serde_json::Value::Object(m) => {
                let mut hm = HashMap::new();
                for (k, v) in m.into_iter() {
                    hm.insert(k, v.try_into()?);
                }
                Ok(Value::Map(hm))
            }
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = Error;

    fn try_from(value: Value) -> Result<bool, Self::Error> {
        if let Value::Bool(b) = value {
            Ok(b)
        } else {
            Err(Error::TypeConversionFailed {
                src: value.variant_name().to_string(),
                dst: "bool".to_string(),
            })
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<f64, Self::Error> {
        if let Value::Int64(i) = value {
            Ok(i as f64)
        } else if let Value::UInt64(i) = value {
            Ok(i as f64)
        } else if let Value::Float64(f) = value {
            Ok(f)
        } else {
            Err(Error::TypeConversionFailed {
                src: value.variant_name().to_string(),
                dst: "f64".to_string(),
            })
        }
    }
}

impl TryFrom<Value> for i32 {
    type Error = Error;

    fn try_from(value: Value) -> Result<i32, Self::Error> {
        match value {
            Value::Int64(i) => i32::try_from(i).map_err(|_| Error::TypeConversionFailed {
                src: value.variant_name().to_string(),
                dst: "i32".to_string(),
            }),
            Value::UInt64(i) => i32::try_from(i).map_err(|_| Error::TypeConversionFailed {
                src: value.variant_name().to_string(),
                dst: "i32".to_string(),
            }),
            _ => Err(Error::TypeConversionFailed {
                src: value.variant_name().to_string(),
                dst: "i32".to_string(),
            }),
        }
    }
}

/// Converts strings directly, and integers by their decimal representation, which is how
/// GraphQL serializes an integer into a `String` or `ID` field.
impl TryFrom<Value> for String {
    type Error = Error;

    fn try_from(value: Value) -> Result<String, Self::Error> {
        match value {
            Value::String(s) => Ok(s),
            Value::Int64(i) => Ok(i.to_string()),
            Value::UInt64(i) => Ok(i.to_string()),
            _ => Err(Error::TypeConversionFailed {
                src: value.variant_name().to_string(),
                dst: "String".to_string(),
            }),
        }
    }
}

impl TryFrom<Value> for serde_json::Value {
    type Error = Error;

    fn try_from(value: Value) -> Result<serde_json::Value, Error> {
        match value {
            Value::Array(a) => {
                let mut v = Vec::new();
                for val in a {
                    v.push(val.try_into()?)
                }
                Ok(serde_json::Value::Array(v))
            }
            Value::Bool(b) => Ok(serde_json::Value::Bool(b)),
            Value::Float64(f) => Ok(serde_json::Value::Number(
                serde_json::Number::from_f64(f).ok_or_else(|| Error::TypeConversionFailed {
                    src: "Value::Float64".to_string(),
                    dst: "serde_json::Number".to_string(),
                })?,
            )),
            Value::Int64(i) => Ok(serde_json::Value::Number(i.into())),
            Value::Map(hm) => {
                let mut m = serde_json::Map::new();
                for (k, v) in hm.into_iter() {
                    m.insert(k.to_string(), v.try_into()?);
                }
                Ok(serde_json::Value::Object(m))
            }
            Value::Null => Ok(serde_json::Value::Null),
            Value::String(s) => Ok(serde_json::Value::String(s)),
            Value::UInt64(i) => Ok(serde_json::Value::Number(i.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Value;
    use crate::error::Error;
    use assert_approx_eq::assert_approx_eq;
    use maplit::hashmap;
    use serde_json::json;
    use std::convert::{TryFrom, TryInto};

    /// Passes if nested JSON converts into nested maps and arrays
    #[test]
    fn from_json() {
        let v: Value = json!({"path": {"uri": "<front>", "weights": [1, 2.5]}})
            .try_into()
            .unwrap();

        let path = v.get("path").unwrap();
        assert_eq!(path.get("uri"), Some(&Value::from("<front>")));
        assert_eq!(
            path.get("weights"),
            Some(&Value::Array(vec![Value::Int64(1), Value::Float64(2.5)]))
        );
    }

    /// Passes if property access on a non-map yields nothing
    #[test]
    fn get_on_scalar() {
        assert!(Value::from("Some string value").get("name").is_none());
        assert!(Value::Null.get("name").is_none());
    }

    /// Passes if integers outside of the i32 range are rejected
    #[test]
    fn i32_range() {
        assert_eq!(i32::try_from(Value::Int64(234)).unwrap(), 234);
        assert!(i32::try_from(Value::Int64(i64::from(i32::MAX) + 1)).is_err());
        assert!(i32::try_from(Value::from("234")).is_err());
    }

    /// Passes if a failed conversion names the variant of the value
    #[test]
    fn conversion_error_names_variant() {
        let e = String::try_from(Value::Float64(3.5)).unwrap_err();

        assert!(matches!(
            e,
            Error::TypeConversionFailed { ref src, ref dst }
                if src == "Value::Float64" && dst == "String"
        ));
        assert!(!e.to_string().contains('\n'));
    }

    /// Passes if integers and floats both convert into f64
    #[test]
    fn f64_from_numbers() {
        assert_approx_eq!(f64::try_from(Value::Float64(3.3)).unwrap(), 3.3);
        assert_approx_eq!(f64::try_from(Value::Int64(-2)).unwrap(), -2.0);
        assert_approx_eq!(f64::try_from(Value::UInt64(7)).unwrap(), 7.0);
        assert!(f64::try_from(Value::from("3.3")).is_err());
    }

    /// Passes if integers convert into their string representation
    #[test]
    fn string_from_int() {
        assert_eq!(String::try_from(Value::Int64(5)).unwrap(), "5");
        assert!(String::try_from(Value::Bool(true)).is_err());
    }

    /// Passes if a map converts back into JSON
    #[test]
    fn to_json() {
        let v = Value::Map(hashmap! {
            "name".to_string() => Value::from("some tree"),
            "id".to_string() => Value::from(5),
        });

        let j: serde_json::Value = v.try_into().unwrap();
        assert_eq!(j, json!({"name": "some tree", "id": 5}));
    }

    /// Passes if options map None onto null
    #[test]
    fn from_option() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::String("x".to_string()));
    }
}
