//! Document and partition-key value types
//!
//! A [`Document`] is a schema-less JSON object with a required string `id`
//! field. The partition-key field is not fixed here: its path belongs to the
//! container, so documents resolve their partition-key value against the
//! path of whatever container they are written to.

use crate::domain::{Result, StoreError};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// System field carrying the server-assigned version tag
const ETAG_FIELD: &str = "_etag";

/// A schema-less JSON document, the unit of storage
///
/// Documents are transient value objects: reads and queries produce them,
/// write operations consume them. Mutating a stored document is always
/// read-modify-write: fetch a copy, change fields, submit it whole.
///
/// # Examples
///
/// ```
/// use docstore::domain::Document;
/// use serde_json::json;
///
/// let doc = Document::from_value(json!({
///     "id": "SalesOrder1",
///     "partitionKey": "Account1",
///     "subtotal": 100,
/// })).unwrap();
///
/// assert_eq!(doc.id(), "SalesOrder1");
/// assert_eq!(doc.field("subtotal"), Some(&json!(100)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    fields: Map<String, Value>,
}

impl Document {
    /// Creates a document from a JSON value
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidDocument`] if the value is not a JSON
    /// object or does not carry a non-empty string `id` field.
    pub fn from_value(value: Value) -> Result<Self> {
        let fields = match value {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::InvalidDocument(format!(
                    "expected a JSON object, got {}",
                    json_type_name(&other)
                )))
            }
        };

        match fields.get("id") {
            Some(Value::String(id)) if !id.trim().is_empty() => {}
            Some(Value::String(_)) => {
                return Err(StoreError::InvalidDocument(
                    "'id' field must not be empty".to_string(),
                ))
            }
            Some(other) => {
                return Err(StoreError::InvalidDocument(format!(
                    "'id' field must be a string, got {}",
                    json_type_name(other)
                )))
            }
            None => {
                return Err(StoreError::InvalidDocument(
                    "missing required 'id' field".to_string(),
                ))
            }
        }

        Ok(Self { fields })
    }

    /// The document id
    ///
    /// Guaranteed non-empty by construction. Returns an empty string only if
    /// the caller removed or retyped the `id` field after construction.
    pub fn id(&self) -> &str {
        self.fields.get("id").and_then(Value::as_str).unwrap_or("")
    }

    /// Resolves the partition-key value at the given container path
    ///
    /// The path uses the container's `/`-separated form, e.g.
    /// `/partitionKey` or `/address/zip`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidDocument`] if the path is absent or the
    /// value at the path is not a JSON scalar.
    pub fn partition_key(&self, path: &str) -> Result<PartitionKeyValue> {
        let mut current = &Value::Null;
        let mut first = true;
        for segment in path.trim_start_matches('/').split('/') {
            let map = if first {
                &self.fields
            } else {
                current.as_object().ok_or_else(|| {
                    StoreError::InvalidDocument(format!(
                        "partition-key path '{path}' does not resolve to a field"
                    ))
                })?
            };
            current = map.get(segment).ok_or_else(|| {
                StoreError::InvalidDocument(format!(
                    "document '{}' is missing partition-key field at '{path}'",
                    self.id()
                ))
            })?;
            first = false;
        }
        PartitionKeyValue::try_from(current)
    }

    /// The server-assigned version tag, if this document came from a read
    pub fn etag(&self) -> Option<&str> {
        self.fields.get(ETAG_FIELD).and_then(Value::as_str)
    }

    /// Returns a field value by name
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Sets a field value, replacing any existing value
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Removes a field, returning its previous value
    pub fn remove_field(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Borrow the underlying field map
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Consumes the document, returning it as a JSON value
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    /// Clones the document into a JSON value
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.fields.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Document::from_value(value).map_err(D::Error::custom)
    }
}

/// The scalar value of a document's partition-key field
///
/// Determines the document's physical placement group. Every point operation
/// must supply the same value the document was created with; a mismatch is
/// indistinguishable from the document not existing.
#[derive(Debug, Clone, PartialEq)]
pub enum PartitionKeyValue {
    String(String),
    /// Integers keep their exact value; routing them through `f64` would
    /// collide distinct keys beyond 2^53.
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl PartitionKeyValue {
    /// The value as a JSON value
    pub fn to_json(&self) -> Value {
        match self {
            PartitionKeyValue::String(s) => Value::String(s.clone()),
            PartitionKeyValue::Int(n) => Value::Number(serde_json::Number::from(*n)),
            PartitionKeyValue::Float(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            PartitionKeyValue::Bool(b) => Value::Bool(*b),
            PartitionKeyValue::Null => Value::Null,
        }
    }

    /// Canonical string form, usable as a placement-scope key
    pub fn canonical(&self) -> String {
        self.to_json().to_string()
    }
}

impl TryFrom<&Value> for PartitionKeyValue {
    type Error = StoreError;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(PartitionKeyValue::String(s.clone())),
            Value::Number(n) => n
                .as_i64()
                .map(PartitionKeyValue::Int)
                .or_else(|| n.as_f64().map(PartitionKeyValue::Float))
                .ok_or_else(|| {
                    StoreError::InvalidDocument("partition-key number out of range".to_string())
                }),
            Value::Bool(b) => Ok(PartitionKeyValue::Bool(*b)),
            Value::Null => Ok(PartitionKeyValue::Null),
            other => Err(StoreError::InvalidDocument(format!(
                "partition-key value must be a scalar, got {}",
                json_type_name(other)
            ))),
        }
    }
}

impl From<&str> for PartitionKeyValue {
    fn from(s: &str) -> Self {
        PartitionKeyValue::String(s.to_string())
    }
}

impl From<String> for PartitionKeyValue {
    fn from(s: String) -> Self {
        PartitionKeyValue::String(s)
    }
}

impl From<f64> for PartitionKeyValue {
    fn from(n: f64) -> Self {
        PartitionKeyValue::Float(n)
    }
}

impl From<i64> for PartitionKeyValue {
    fn from(n: i64) -> Self {
        PartitionKeyValue::Int(n)
    }
}

impl From<bool> for PartitionKeyValue {
    fn from(b: bool) -> Self {
        PartitionKeyValue::Bool(b)
    }
}

impl fmt::Display for PartitionKeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionKeyValue::String(s) => write!(f, "{s}"),
            PartitionKeyValue::Int(n) => write!(f, "{n}"),
            PartitionKeyValue::Float(n) => write!(f, "{n}"),
            PartitionKeyValue::Bool(b) => write!(f, "{b}"),
            PartitionKeyValue::Null => write!(f, "null"),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
