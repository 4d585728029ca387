use std::collections::BTreeMap;
use std::iter::FromIterator;

use primescape_core::errors::ScapeError;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered = map
                .into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect::<BTreeMap<_, _>>();
            Value::Object(Map::from_iter(ordered))
        }
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Serializes a value into pretty canonical JSON with sorted keys.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, ScapeError> {
    let value =
        serde_json::to_value(value).map_err(|err| ScapeError::serde("sim.json_serialize", err))?;
    let canonical = canonicalize(value);
    let mut bytes = serde_json::to_vec_pretty(&canonical)
        .map_err(|err| ScapeError::serde("sim.json_write", err))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Serializes a value into YAML.
pub fn to_yaml_string<T: Serialize>(value: &T) -> Result<String, ScapeError> {
    serde_yaml::to_string(value).map_err(|err| ScapeError::serde("sim.yaml_serialize", err))
}

/// Deserializes a YAML payload into the requested type.
pub fn from_yaml_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, ScapeError> {
    serde_yaml::from_slice(data).map_err(|err| ScapeError::serde("sim.yaml_deserialize", err))
}
