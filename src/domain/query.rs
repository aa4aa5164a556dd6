//! Parameterized query specification
//!
//! Parameters are always bound by name, never spliced into the query text.
//! Query execution, correctness, and ordering are service-defined; the
//! facade only carries the specification across the transport seam.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A filter query with named parameters
///
/// # Examples
///
/// ```
/// use docstore::domain::QuerySpec;
///
/// let spec = QuerySpec::new("SELECT * FROM c WHERE c.partitionKey = @account")
///     .with_parameter("@account", "Account1");
///
/// assert_eq!(spec.parameters().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    text: String,
    parameters: Vec<QueryParameter>,
}

/// A single named query parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryParameter {
    pub name: String,
    pub value: Value,
}

impl QuerySpec {
    /// Creates a query with no parameters
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parameters: Vec::new(),
        }
    }

    /// Binds a named parameter
    ///
    /// Names follow the service convention of an `@` prefix; one is added
    /// when missing so callers may write either form.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let name = if name.starts_with('@') {
            name
        } else {
            format!("@{name}")
        };
        self.parameters.push(QueryParameter {
            name,
            value: value.into(),
        });
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parameters(&self) -> &[QueryParameter] {
        &self.parameters
    }

    /// Looks up a bound parameter value by name
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }
}
