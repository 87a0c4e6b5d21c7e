//! YAML parsing using yaml-rust2
//!
//! Documents are parsed with yaml-rust2, converted to `serde_json::Value`,
//! and then deserialized into typed structs with serde.

use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use yaml_rust2::{Yaml, YamlLoader};

/// Error type for YAML parsing
#[derive(Debug, Clone)]
pub struct YamlError(String);

impl std::fmt::Display for YamlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for YamlError {}

/// Parse a YAML string into a serde_json::Value.
///
/// Only the first document is read. Returns `Value::Null` for empty input.
pub fn parse_yaml(input: &str) -> Result<Value, YamlError> {
    let docs = YamlLoader::load_from_str(input).map_err(|e| YamlError(e.to_string()))?;
    match docs.into_iter().next() {
        Some(doc) => yaml_to_json(doc),
        None => Ok(Value::Null),
    }
}

/// Parse a YAML string straight into a typed value
pub fn from_yaml<T: DeserializeOwned>(input: &str) -> Result<T, YamlError> {
    let value = parse_yaml(input)?;
    serde_json::from_value(value).map_err(|e| YamlError(e.to_string()))
}

fn yaml_to_json(yaml: Yaml) -> Result<Value, YamlError> {
    let value = match yaml {
        Yaml::Null => Value::Null,
        Yaml::Boolean(b) => Value::Bool(b),
        Yaml::Integer(i) => Value::from(i),
        Yaml::String(s) => Value::String(s),
        Yaml::Real(raw) => {
            let f: f64 = raw
                .parse()
                .map_err(|_| YamlError(format!("invalid float: {raw}")))?;
            Number::from_f64(f).map_or(Value::Null, Value::Number)
        }
        Yaml::Array(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Hash(entries) => {
            let mut object = Map::with_capacity(entries.len());
            for (key, value) in entries {
                object.insert(mapping_key(key)?, yaml_to_json(value)?);
            }
            Value::Object(object)
        }
        Yaml::Alias(_) => return Err(YamlError("YAML aliases are not supported".to_string())),
        Yaml::BadValue => return Err(YamlError("bad YAML value".to_string())),
    };
    Ok(value)
}

// Label and tag maps may use unquoted scalars as keys, e.g. `1: gpu`
fn mapping_key(key: Yaml) -> Result<String, YamlError> {
    match key {
        Yaml::String(s) | Yaml::Real(s) => Ok(s),
        Yaml::Integer(i) => Ok(i.to_string()),
        Yaml::Boolean(b) => Ok(b.to_string()),
        other => Err(YamlError(format!("unsupported mapping key: {other:?}"))),
    }
}
