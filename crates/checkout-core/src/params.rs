//! Request Parameters
//!
//! Submitted form values addressed by `/`-separated paths, e.g.
//! `c_payment/invoice` reads the `invoice` entry of the `c_payment` object.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::Attributes;

/// Parameters of one inbound request
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestParams(serde_json::Map<String, Value>);

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON value, anything but an object yields no parameters
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// Set a top-level parameter
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.0.insert(name.into(), value);
        self
    }

    /// Look up a parameter by path
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('/').filter(|p| !p.is_empty());
        let mut current = self.0.get(parts.next()?)?;

        for part in parts {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(list) => list.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        Some(current)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some_and(|v| !v.is_null())
    }

    /// Read one or many identifiers; `None` when the parameter is absent
    pub fn ids(&self, path: &str) -> Option<Vec<String>> {
        let value = self.get(path)?;

        let ids = match value {
            Value::Null => return None,
            Value::Array(list) => list.iter().filter_map(scalar_to_string).collect(),
            other => scalar_to_string(other).into_iter().collect(),
        };

        Some(ids)
    }

    /// Read an attribute mapping, empty when absent or not an object
    pub fn attributes(&self, path: &str) -> Attributes {
        match self.get(path) {
            Some(Value::Object(map)) => map.clone(),
            _ => Attributes::new(),
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
