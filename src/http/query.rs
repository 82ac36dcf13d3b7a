//! Query string parameters
//!
//! Canvas expects array values in bracket notation: `include[]=a&include[]=b`.

use crate::error::{Error, Result};
use serde_json::Value;
use std::fmt::Display;
use url::form_urlencoded::byte_serialize;

/// A single parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// `key=value`
    Scalar(String),
    /// `key[]=v1&key[]=v2`
    List(Vec<String>),
}

/// Ordered query parameters
///
/// Keys keep insertion order. Setting a key that is already present
/// replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, QueryValue)>,
}

impl QueryParams {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a scalar parameter
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.insert(key.into(), QueryValue::Scalar(value.to_string()));
        self
    }

    /// Set an array parameter
    #[must_use]
    pub fn list<I>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Display,
    {
        let values = values.into_iter().map(|v| v.to_string()).collect();
        self.insert(key.into(), QueryValue::List(values));
        self
    }

    /// Append a value to an array parameter, creating it if missing
    pub fn push(&mut self, key: impl Into<String>, value: impl Display) {
        let key = key.into();
        let value = value.to_string();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, QueryValue::List(values))) => values.push(value),
            Some((_, slot)) => *slot = QueryValue::List(vec![value]),
            None => self.pairs.push((key, QueryValue::List(vec![value]))),
        }
    }

    /// Build parameters from a JSON object
    ///
    /// `null` members are skipped. Scalars become scalar parameters and
    /// arrays of scalars become array parameters; anything nested deeper is
    /// rejected.
    pub fn from_json(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(Error::usage("query parameters must be a JSON object"));
        };

        let mut params = Self::new();
        for (key, value) in map {
            match value {
                Value::Null => {}
                Value::Array(items) => {
                    let items = items
                        .iter()
                        .map(|item| scalar(key, item))
                        .collect::<Result<Vec<_>>>()?;
                    params.insert(key.clone(), QueryValue::List(items));
                }
                other => params.insert(key.clone(), QueryValue::Scalar(scalar(key, other)?)),
            }
        }
        Ok(params)
    }

    /// Look up a parameter
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True when no parameter is set
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Serialize to a query string (without the leading `?`)
    ///
    /// Returns `None` when there is nothing to send. Empty arrays produce no
    /// pairs.
    pub fn to_query_string(&self) -> Option<String> {
        let mut parts = Vec::new();
        for (key, value) in &self.pairs {
            let key = encode(key);
            match value {
                QueryValue::Scalar(v) => parts.push(format!("{key}={}", encode(v))),
                QueryValue::List(values) => {
                    parts.extend(values.iter().map(|v| format!("{key}[]={}", encode(v))));
                }
            }
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("&"))
        }
    }

    fn insert(&mut self, key: String, value: QueryValue) {
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.pairs.push((key, value)),
        }
    }
}

impl<K: Into<String>, V: Display> FromIterator<(K, V)> for QueryParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::new(), |params, (k, v)| params.param(k, v))
    }
}

fn scalar(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(Error::usage(format!(
            "query parameter '{key}' must be a scalar or an array of scalars"
        ))),
    }
}

fn encode(s: &str) -> String {
    byte_serialize(s.as_bytes()).collect()
}
