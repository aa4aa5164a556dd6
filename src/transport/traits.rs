//! Transport abstraction traits
//!
//! This module defines the seam between the facade and the underlying
//! database service. The facade depends on transports only through these
//! traits, which keeps vendor SDK types out of the public API and lets the
//! test suite run against an in-process implementation.

use crate::domain::{
    ContainerHandle, DatabaseHandle, Document, PartitionKeyValue, QuerySpec, Result,
    ThroughputSetting,
};
use async_trait::async_trait;

/// One page of documents pulled from a paged sequence
#[derive(Debug, Clone)]
pub struct DocumentPage {
    /// Documents in service-returned order
    pub documents: Vec<Document>,
}

/// A lazy cursor over a paged result sequence
///
/// Each `next_page` call is one round trip fetching at most the page size
/// requested when the cursor was opened. `Ok(None)` means the sequence is
/// exhausted. Dropping a cursor mid-sequence abandons the remaining pages
/// and releases any held continuation state without error.
#[async_trait]
pub trait DocumentCursor: Send {
    /// Fetches the next page, or `None` when exhausted
    ///
    /// # Errors
    ///
    /// Returns an error if the page fetch fails; a previously delivered
    /// prefix of the sequence is unaffected.
    async fn next_page(&mut self) -> Result<Option<DocumentPage>>;
}

/// Transport operations against one database service account
///
/// Implementations translate these calls into service requests and classify
/// service failures into [`StoreError`](crate::domain::StoreError) variants.
/// Point operations are atomic-or-not-happened; none of them retries
/// internally, throttle signals included.
#[async_trait]
pub trait DocumentTransport: Send + Sync {
    /// Creates the database if absent, else returns the existing handle
    async fn ensure_database(&self, database_id: &str) -> Result<DatabaseHandle>;

    /// Creates the container with the given partition-key path if absent,
    /// else returns the existing handle
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SchemaConflict`](crate::domain::StoreError::SchemaConflict)
    /// when the container exists with a different partition-key path.
    async fn ensure_container(
        &self,
        database_id: &str,
        container_id: &str,
        partition_key_path: &str,
    ) -> Result<ContainerHandle>;

    /// Inserts a new document, failing with `AlreadyExists` on a duplicate id
    /// within the partition scope embedded in the document
    async fn create_document(
        &self,
        container: &ContainerHandle,
        document: Document,
    ) -> Result<Document>;

    /// Point read by id and partition key
    async fn read_document(
        &self,
        container: &ContainerHandle,
        id: &str,
        partition_key: &PartitionKeyValue,
    ) -> Result<Document>;

    /// Full-document overwrite of an existing document
    ///
    /// With `expected_version` set, the replace only succeeds when the
    /// stored version tag still matches; a mismatch yields `VersionConflict`.
    async fn replace_document(
        &self,
        container: &ContainerHandle,
        id: &str,
        partition_key: &PartitionKeyValue,
        document: Document,
        expected_version: Option<&str>,
    ) -> Result<Document>;

    /// Creates the document if absent, replaces it if present
    async fn upsert_document(
        &self,
        container: &ContainerHandle,
        document: Document,
    ) -> Result<Document>;

    /// Deletes a document, failing with `NotFound` when absent
    async fn delete_document(
        &self,
        container: &ContainerHandle,
        id: &str,
        partition_key: &PartitionKeyValue,
    ) -> Result<()>;

    /// Opens a cursor over every document in the container
    async fn read_all_documents(
        &self,
        container: &ContainerHandle,
        page_size: usize,
    ) -> Result<Box<dyn DocumentCursor>>;

    /// Opens a cursor over the results of a parameterized query
    ///
    /// Results stream in service order; the transport applies no re-ordering
    /// or client-side filtering. An empty result is a valid, empty cursor.
    async fn query_documents(
        &self,
        container: &ContainerHandle,
        query: &QuerySpec,
        page_size: usize,
    ) -> Result<Box<dyn DocumentCursor>>;

    /// Reads the container's explicit provisioned throughput
    ///
    /// # Errors
    ///
    /// Returns `ThroughputNotConfigured` when the container has no explicit
    /// offer (shared or autoscale provisioning).
    async fn read_throughput(&self, container: &ContainerHandle) -> Result<ThroughputSetting>;

    /// Replaces the container's provisioned RU/s
    ///
    /// No client-side bounds checking: the service validates the requested
    /// rate and rejects out-of-range values with `InvalidThroughput`.
    async fn replace_throughput(
        &self,
        container: &ContainerHandle,
        setting: ThroughputSetting,
    ) -> Result<ThroughputSetting>;
}
