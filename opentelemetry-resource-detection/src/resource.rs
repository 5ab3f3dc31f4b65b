//! Detected resource representation and the helpers used to combine and
//! serialize it.
//!
//! A [`Resource`] is the identity of the entity producing telemetry (host,
//! container, cloud instance, ...) expressed as attributes. Unlike
//! [`opentelemetry_sdk::Resource`], attribute values may nest: a [`Value`] can
//! hold arrays of arbitrary values and string-keyed maps.
use opentelemetry::{Array, KeyValue, StringValue};
use serde_json::{Map, Number};
use std::collections::{hash_map, HashMap};
use std::sync::Arc;

/// A resource attribute value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Unset value.
    Empty,
    /// Boolean value.
    Bool(bool),
    /// Signed 64-bit integer value.
    I64(i64),
    /// 64-bit float value.
    F64(f64),
    /// String value.
    String(String),
    /// Ordered list of values.
    Array(Vec<Value>),
    /// Nested key-unique map of values.
    Map(HashMap<String, Value>),
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::I64(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::I64(i.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::F64(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(values)
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(map: HashMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl From<opentelemetry::Value> for Value {
    fn from(value: opentelemetry::Value) -> Self {
        match value {
            opentelemetry::Value::Bool(b) => Value::Bool(b),
            opentelemetry::Value::I64(i) => Value::I64(i),
            opentelemetry::Value::F64(f) => Value::F64(f),
            opentelemetry::Value::String(s) => Value::String(s.to_string()),
            opentelemetry::Value::Array(array) => Value::Array(match array {
                Array::Bool(v) => v.into_iter().map(Value::Bool).collect(),
                Array::I64(v) => v.into_iter().map(Value::I64).collect(),
                Array::F64(v) => v.into_iter().map(Value::F64).collect(),
                Array::String(v) => v
                    .into_iter()
                    .map(|s| Value::String(s.to_string()))
                    .collect(),
                other => vec![Value::String(other.to_string())],
            }),
            other => Value::String(other.to_string()),
        }
    }
}

/// The entity producing telemetry, as a set of uniquely keyed attributes.
///
/// The attribute map is shared through an `Arc`, so clones are cheap. A
/// resource handed out by a [`ResourceProvider`](crate::ResourceProvider) is
/// never mutated in place: writes to a shared resource copy the map first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Resource {
    attrs: Arc<HashMap<String, Value>>,
}

impl Resource {
    /// Creates a resource with no attributes.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a resource from key value pairs.
    ///
    /// Values are de-duplicated by key, and the last key-value pair will be retained.
    pub fn from_attributes<I, K, V>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Resource {
            attrs: Arc::new(
                attributes
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Returns the number of attributes for this resource.
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Returns `true` if the resource contains no attributes.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Retrieve the value associated with `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key)
    }

    /// Returns `true` if the resource has an attribute named `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.attrs.contains_key(key)
    }

    /// Gets an iterator over the attributes of this resource.
    pub fn iter(&self) -> Iter<'_> {
        Iter(self.attrs.iter())
    }

    /// Sets `key` only if the resource does not have it yet. Returns whether
    /// the value was inserted.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        let key = key.into();
        if self.attrs.contains_key(&key) {
            return false;
        }
        Arc::make_mut(&mut self.attrs).insert(key, value.into());
        true
    }

    /// Sets `key`, replacing any existing value.
    pub fn upsert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        Arc::make_mut(&mut self.attrs).insert(key.into(), value.into());
    }

    /// Converts this resource into an [`opentelemetry_sdk::Resource`].
    ///
    /// Scalars and homogeneous scalar arrays map directly. Mixed arrays and
    /// nested maps are carried as their JSON rendering, and [`Value::Empty`]
    /// attributes are dropped.
    pub fn to_sdk_resource(&self) -> opentelemetry_sdk::Resource {
        opentelemetry_sdk::Resource::builder_empty()
            .with_attributes(
                self.iter()
                    .filter_map(|(k, v)| to_otel_value(v).map(|v| KeyValue::new(k.clone(), v))),
            )
            .build()
    }
}

impl From<&opentelemetry_sdk::Resource> for Resource {
    fn from(resource: &opentelemetry_sdk::Resource) -> Self {
        Resource::from_attributes(
            resource
                .iter()
                .map(|(k, v)| (k.as_str().to_owned(), Value::from(v.clone()))),
        )
    }
}

/// An iterator over the entries of a `Resource`.
#[derive(Debug)]
pub struct Iter<'a>(hash_map::Iter<'a, String, Value>);

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a String, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
}

impl<'a> IntoIterator for &'a Resource {
    type Item = (&'a String, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn to_otel_value(value: &Value) -> Option<opentelemetry::Value> {
    Some(match value {
        Value::Empty => return None,
        Value::Bool(b) => (*b).into(),
        Value::I64(i) => (*i).into(),
        Value::F64(f) => (*f).into(),
        Value::String(s) => s.clone().into(),
        Value::Array(values) => to_otel_array(values)
            .map(opentelemetry::Value::Array)
            .unwrap_or_else(|| flatten_value(value).to_string().into()),
        Value::Map(_) => flatten_value(value).to_string().into(),
    })
}

fn to_otel_array(values: &[Value]) -> Option<Array> {
    match values.first()? {
        Value::Bool(_) => values
            .iter()
            .map(|v| match v {
                Value::Bool(b) => Some(*b),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(Array::Bool),
        Value::I64(_) => values
            .iter()
            .map(|v| match v {
                Value::I64(i) => Some(*i),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(Array::I64),
        Value::F64(_) => values
            .iter()
            .map(|v| match v {
                Value::F64(f) => Some(*f),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(Array::F64),
        Value::String(_) => values
            .iter()
            .map(|v| match v {
                Value::String(s) => Some(StringValue::from(s.clone())),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(Array::String),
        _ => None,
    }
}

/// Merges the attributes of `from` into `to`.
///
/// With `override_to` set, values from `from` replace existing ones
/// (last write wins); otherwise only missing keys are added (first write
/// wins). Colliding keys are dropped silently in the latter case.
pub fn merge_resource(to: &mut Resource, from: &Resource, override_to: bool) {
    if is_empty_resource(from) {
        return;
    }

    for (k, v) in from {
        if override_to {
            to.upsert(k.clone(), v.clone());
        } else {
            to.insert(k.clone(), v.clone());
        }
    }
}

/// Returns `true` if the resource has no attributes.
pub fn is_empty_resource(resource: &Resource) -> bool {
    resource.is_empty()
}

/// Flattens a resource into plain JSON values, suitable for logging.
pub fn flatten(resource: &Resource) -> Map<String, serde_json::Value> {
    resource
        .iter()
        .map(|(k, v)| (k.clone(), flatten_value(v)))
        .collect()
}

/// Recursively unwraps a single attribute value into a plain JSON value.
///
/// Unset values and non-finite floats become `null`.
pub fn flatten_value(value: &Value) -> serde_json::Value {
    match value {
        Value::Empty => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::I64(i) => serde_json::Value::Number((*i).into()),
        Value::F64(f) => Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Array(values) => serde_json::Value::Array(values.iter().map(flatten_value).collect()),
        Value::Map(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), flatten_value(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::Key;
    use serde_json::json;

    #[test]
    fn merge_insert_only_keeps_existing_keys() {
        let mut to = Resource::from_attributes([("a", 1)]);
        let from = Resource::from_attributes([("a", 2), ("b", 2)]);

        merge_resource(&mut to, &from, false);

        assert_eq!(to, Resource::from_attributes([("a", 1), ("b", 2)]));
    }

    #[test]
    fn merge_override_replaces_existing_keys() {
        let mut to = Resource::from_attributes([("a", 1)]);
        let from = Resource::from_attributes([("a", 2), ("b", 2)]);

        merge_resource(&mut to, &from, true);

        assert_eq!(to, Resource::from_attributes([("a", 2), ("b", 2)]));
    }

    #[test]
    fn merge_empty_source_is_noop() {
        let original = Resource::from_attributes([("a", "x")]);
        for override_to in [false, true] {
            let mut to = original.clone();
            merge_resource(&mut to, &Resource::empty(), override_to);
            assert_eq!(to, original);
        }
    }

    #[test]
    fn merge_does_not_touch_shared_copies() {
        let published = Resource::from_attributes([("a", 1)]);
        let mut to = published.clone();

        merge_resource(&mut to, &Resource::from_attributes([("b", 2)]), false);

        assert_eq!(published.len(), 1);
        assert_eq!(to.len(), 2);
    }

    #[test]
    fn is_empty_resource_counts_attributes() {
        assert!(is_empty_resource(&Resource::empty()));
        assert!(!is_empty_resource(&Resource::from_attributes([(
            "k",
            Value::Empty
        )])));
    }

    #[test]
    fn flatten_preserves_shape() {
        let nested = HashMap::from([
            ("inner".to_string(), Value::from("v")),
            ("count".to_string(), Value::from(3)),
        ]);
        let resource = Resource::from_attributes([
            ("bool", Value::from(true)),
            ("int", Value::from(42)),
            ("str", Value::from("value")),
            ("map", Value::Map(nested)),
            (
                "array",
                Value::Array(vec![Value::from("a"), Value::from(1.5), Value::Empty]),
            ),
        ]);

        let flat = flatten(&resource);

        assert_eq!(flat.len(), 5);
        assert_eq!(flat["bool"], json!(true));
        assert_eq!(flat["int"], json!(42));
        assert_eq!(flat["str"], json!("value"));
        assert_eq!(flat["map"], json!({"inner": "v", "count": 3}));
        assert_eq!(flat["array"], json!(["a", 1.5, null]));
    }

    #[test]
    fn flatten_non_finite_float_is_null() {
        assert_eq!(flatten_value(&Value::F64(f64::NAN)), serde_json::Value::Null);
    }

    #[test]
    fn to_sdk_resource_converts_values() {
        let resource = Resource::from_attributes([
            ("service.name", Value::from("svc")),
            ("pid", Value::from(7)),
            (
                "tags",
                Value::Array(vec![Value::from("a"), Value::from("b")]),
            ),
            ("mixed", Value::Array(vec![Value::from("a"), Value::from(1)])),
            ("unset", Value::Empty),
        ]);

        let sdk = resource.to_sdk_resource();

        assert_eq!(sdk.len(), 4);
        assert_eq!(
            sdk.get(&Key::from_static_str("service.name")),
            Some(opentelemetry::Value::from("svc"))
        );
        assert_eq!(
            sdk.get(&Key::from_static_str("pid")),
            Some(opentelemetry::Value::I64(7))
        );
        assert_eq!(
            sdk.get(&Key::from_static_str("tags")),
            Some(opentelemetry::Value::Array(Array::String(vec![
                "a".into(),
                "b".into()
            ])))
        );
        assert_eq!(
            sdk.get(&Key::from_static_str("mixed")),
            Some(opentelemetry::Value::from("[\"a\",1]"))
        );
    }

    #[test]
    fn from_sdk_resource_round_trips_scalars() {
        let sdk = opentelemetry_sdk::Resource::builder_empty()
            .with_attributes([KeyValue::new("k", "v"), KeyValue::new("n", 3_i64)])
            .build();

        let resource = Resource::from(&sdk);

        assert_eq!(resource.get("k"), Some(&Value::from("v")));
        assert_eq!(resource.get("n"), Some(&Value::I64(3)));
    }
}
