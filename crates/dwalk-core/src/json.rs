// Bridge between serde_json documents and walkable `Value` trees.
// - Objects keep their key order (serde_json `preserve_order`).
// - `Absent` has no JSON form: it is dropped from objects and written as null elsewhere.
use std::fs;
use std::path::Path;

use serde_json::Value as J;

use crate::error::DocError;
use crate::value::{Mapping, Sequence, Value};

impl From<J> for Value {
    fn from(v: J) -> Self {
        match v {
            J::Null => Value::Null,
            J::Bool(b) => Value::Bool(b),
            J::Number(n) => Value::Number(n),
            J::String(s) => Value::Text(s),
            J::Array(items) => Value::Sequence(items.into_iter().map(Value::from).collect()),
            J::Object(map) => Value::Mapping(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect::<Mapping>(),
            ),
        }
    }
}

impl Value {
    pub fn to_json(&self) -> J {
        match self {
            Value::Absent | Value::Null => J::Null,
            Value::Bool(b) => J::Bool(*b),
            Value::Number(n) => J::Number(n.clone()),
            Value::Text(s) => J::String(s.clone()),
            Value::Sequence(seq) => sequence_to_json(seq),
            Value::Mapping(map) => mapping_to_json(map),
        }
    }
}

fn sequence_to_json(seq: &Sequence) -> J {
    J::Array(seq.to_vec().iter().map(Value::to_json).collect())
}

fn mapping_to_json(map: &Mapping) -> J {
    let mut out = serde_json::Map::with_capacity(map.len());
    for (k, v) in map.entries() {
        if v == Value::Absent {
            continue;
        }
        out.insert(k, v.to_json());
    }
    J::Object(out)
}

pub fn parse_str_to_value(text: &str) -> Result<Value, DocError> {
    if text.trim().is_empty() {
        return Err(DocError::Empty);
    }
    let json: J = serde_json::from_str(text)?;
    Ok(json.into())
}

pub fn parse_file_to_value(path: &Path) -> Result<Value, DocError> {
    let data = fs::read_to_string(path)?;
    parse_str_to_value(&data)
}

pub fn write_value_to_file(path: &Path, value: &Value) -> Result<(), DocError> {
    let s = serde_json::to_string_pretty(&value.to_json())?;
    fs::write(path, s)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_key_order_survives_the_bridge() {
        let v = parse_str_to_value(r#"{"z": 1, "a": [true, "x"], "m": null}"#).unwrap();
        assert_eq!(v.as_mapping().unwrap().keys(), vec!["z", "a", "m"]);
        let back = serde_json::to_string(&v.to_json()).unwrap();
        assert_eq!(back, r#"{"z":1,"a":[true,"x"],"m":null}"#);
    }

    #[test]
    fn absent_is_dropped_from_objects_and_nulled_in_arrays() {
        let v = Value::map([
            ("gone", Value::Absent),
            ("list", Value::seq([Value::Absent, Value::from(1)])),
        ]);
        assert_eq!(v.to_json(), json!({"list": [null, 1]}));
    }

    #[test]
    fn blank_input_is_an_error() {
        assert!(matches!(parse_str_to_value("  \n"), Err(DocError::Empty)));
        assert!(matches!(parse_str_to_value("{"), Err(DocError::Json(_))));
    }
}
