//! Domain models and types for docstore.
//!
//! The domain layer provides:
//! - **Document model** ([`Document`], [`PartitionKeyValue`])
//! - **Handles** ([`DatabaseHandle`], [`ContainerHandle`])
//! - **Query specification** ([`QuerySpec`])
//! - **Throughput** ([`ThroughputSetting`])
//! - **Error types** ([`StoreError`]) and the [`Result`] alias
//!
//! All fallible operations in the crate return [`Result<T>`]:
//!
//! ```
//! use docstore::domain::{Document, Result};
//! use serde_json::json;
//!
//! fn build() -> Result<Document> {
//!     Document::from_value(json!({"id": "d1", "partitionKey": "p1"}))
//! }
//! # build().unwrap();
//! ```

pub mod document;
pub mod errors;
pub mod handles;
pub mod query;
pub mod result;
pub mod throughput;

// Re-export commonly used types for convenience
pub use document::{Document, PartitionKeyValue};
pub use errors::StoreError;
pub use handles::{ContainerHandle, DatabaseHandle};
pub use query::{QueryParameter, QuerySpec};
pub use result::Result;
pub use throughput::ThroughputSetting;
