//! Document container client facade
//!
//! [`DocumentContainerClient`] is bound to one (database, container) pair and
//! one partition-key path. It validates documents against the container
//! contract, applies a per-request deadline, and logs every operation with
//! structured fields, delegating the wire work to a
//! [`DocumentTransport`](crate::transport::DocumentTransport).
//!
//! The client is stateless between calls apart from the held
//! [`ContainerHandle`]: each operation is an independent request/response
//! exchange with no implicit transaction spanning calls. Callers racing
//! read-modify-write cycles on the same document coordinate through the
//! optional `expected_version` argument of
//! [`replace_document`](DocumentContainerClient::replace_document).

pub mod pages;
pub mod retry;

pub use pages::DocumentPages;
pub use retry::{retry_throttled, RetryPolicy};

use crate::config::ContainerConfig;
use crate::domain::{
    ContainerHandle, DatabaseHandle, Document, PartitionKeyValue, QuerySpec, Result, StoreError,
    ThroughputSetting,
};
use crate::transport::DocumentTransport;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Typed facade over one document container
///
/// # Examples
///
/// ```
/// use docstore::client::DocumentContainerClient;
/// use docstore::config::ContainerConfig;
/// use docstore::domain::Document;
/// use docstore::transport::MemoryTransport;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> docstore::domain::Result<()> {
/// let transport = Arc::new(MemoryTransport::new());
/// let client =
///     DocumentContainerClient::connect(transport, &ContainerConfig::default()).await?;
///
/// let order = Document::from_value(json!({
///     "id": "SalesOrder1",
///     "partitionKey": "Account1",
///     "subtotal": 100.0,
/// }))?;
/// client.create_document(order).await?;
///
/// let read = client.read_document("SalesOrder1", "Account1".into()).await?;
/// assert_eq!(read.field("subtotal"), Some(&json!(100.0)));
/// # Ok(())
/// # }
/// ```
pub struct DocumentContainerClient {
    transport: Arc<dyn DocumentTransport>,
    container: ContainerHandle,
    request_timeout: Duration,
    default_page_size: usize,
}

// The transport object is opaque; show the binding instead.
impl fmt::Debug for DocumentContainerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentContainerClient")
            .field("container", &self.container)
            .field("request_timeout", &self.request_timeout)
            .field("default_page_size", &self.default_page_size)
            .finish_non_exhaustive()
    }
}

impl DocumentContainerClient {
    /// Connects to a container, provisioning database and container
    /// idempotently
    ///
    /// Both ensure steps are create-or-get: an existing database or container
    /// is not an error. An existing container whose partition-key path
    /// differs from the configured one fails with
    /// [`StoreError::SchemaConflict`].
    pub async fn connect(
        transport: Arc<dyn DocumentTransport>,
        config: &ContainerConfig,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(StoreError::Configuration)?;

        let database = transport.ensure_database(&config.database_id).await?;
        let container = transport
            .ensure_container(
                database.database_id(),
                &config.container_id,
                &config.partition_key_path,
            )
            .await?;

        tracing::info!(
            database = %config.database_id,
            container = %config.container_id,
            partition_key_path = %config.partition_key_path,
            "Connected to container"
        );

        Ok(Self {
            transport,
            container,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            default_page_size: config.page_size,
        })
    }

    /// Sets the per-request deadline, replacing the 30 second default
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// The deadline applied to each operation
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// The bound container's identity
    pub fn container(&self) -> &ContainerHandle {
        &self.container
    }

    /// The bound database's identity
    pub fn database(&self) -> DatabaseHandle {
        DatabaseHandle::new(self.container.database_id())
    }

    /// Inserts a new document
    ///
    /// The document must carry a value at the container's partition-key
    /// path. Returns the stored document with server-assigned metadata
    /// merged in.
    ///
    /// # Errors
    ///
    /// [`StoreError::AlreadyExists`] when the id is already present in the
    /// same partition scope.
    pub async fn create_document(&self, document: Document) -> Result<Document> {
        let partition_key = document.partition_key(self.container.partition_key_path())?;
        tracing::debug!(
            container = %self.container,
            id = %document.id(),
            partition_key = %partition_key,
            "Creating document"
        );

        self.with_deadline(self.transport.create_document(&self.container, document))
            .await
    }

    /// Point read by id and partition key
    ///
    /// The lowest-latency, lowest-cost read; prefer it over a query whenever
    /// both id and partition key are known.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when no document with that id exists under
    /// that partition key, including when a document with the id exists in a
    /// different partition scope.
    pub async fn read_document(
        &self,
        id: &str,
        partition_key: PartitionKeyValue,
    ) -> Result<Document> {
        tracing::debug!(
            container = %self.container,
            id = %id,
            partition_key = %partition_key,
            "Reading document"
        );

        self.with_deadline(self.transport.read_document(&self.container, id, &partition_key))
            .await
    }

    /// Lazily reads every document in the container
    ///
    /// Fetches `page_size` documents per round trip; page boundaries never
    /// leak to the caller. Each call opens a fresh sequence from the start.
    pub async fn read_all_documents(&self, page_size: usize) -> Result<DocumentPages> {
        tracing::debug!(
            container = %self.container,
            page_size = page_size,
            "Reading all documents"
        );

        let cursor = self
            .with_deadline(self.transport.read_all_documents(&self.container, page_size))
            .await?;
        Ok(DocumentPages::new(cursor))
    }

    /// Executes a parameterized filter query
    ///
    /// Parameters are bound by name, never spliced into the text. Results
    /// stream in service order; an empty result is an empty sequence, not an
    /// error.
    pub async fn query_documents(&self, query: QuerySpec) -> Result<DocumentPages> {
        tracing::debug!(
            container = %self.container,
            query = %query.text(),
            "Querying documents"
        );

        let cursor = self
            .with_deadline(self.transport.query_documents(
                &self.container,
                &query,
                self.default_page_size,
            ))
            .await?;
        Ok(DocumentPages::new(cursor))
    }

    /// Full-document overwrite of an existing document
    ///
    /// This is not a partial patch: read the document, mutate the in-memory
    /// copy, and submit it whole. Without `expected_version` concurrent
    /// replacers last-write-win; pass the etag from the read to get
    /// [`StoreError::VersionConflict`] on a lost race instead.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the target does not exist; no document
    /// is inserted in that case.
    pub async fn replace_document(
        &self,
        id: &str,
        partition_key: PartitionKeyValue,
        document: Document,
        expected_version: Option<&str>,
    ) -> Result<Document> {
        tracing::debug!(
            container = %self.container,
            id = %id,
            partition_key = %partition_key,
            guarded = expected_version.is_some(),
            "Replacing document"
        );

        self.with_deadline(self.transport.replace_document(
            &self.container,
            id,
            &partition_key,
            document,
            expected_version,
        ))
        .await
    }

    /// Creates the document if absent, replaces it if present
    ///
    /// Keyed by the id and partition-key value embedded in the document.
    /// Idempotent: upserting an unchanged document leaves the same stored
    /// state as upserting it once.
    pub async fn upsert_document(&self, document: Document) -> Result<Document> {
        let partition_key = document.partition_key(self.container.partition_key_path())?;
        tracing::debug!(
            container = %self.container,
            id = %document.id(),
            partition_key = %partition_key,
            "Upserting document"
        );

        self.with_deadline(self.transport.upsert_document(&self.container, document))
            .await
    }

    /// Deletes a document
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when absent; best-effort callers may treat
    /// that as success.
    pub async fn delete_document(&self, id: &str, partition_key: PartitionKeyValue) -> Result<()> {
        tracing::debug!(
            container = %self.container,
            id = %id,
            partition_key = %partition_key,
            "Deleting document"
        );

        self.with_deadline(self.transport.delete_document(&self.container, id, &partition_key))
            .await
    }

    /// Reads the container's explicit provisioned throughput
    ///
    /// # Errors
    ///
    /// [`StoreError::ThroughputNotConfigured`] when the container was
    /// provisioned in shared or autoscale mode; callers treat that as "not
    /// applicable", not a failure.
    pub async fn get_throughput(&self) -> Result<ThroughputSetting> {
        self.with_deadline(self.transport.read_throughput(&self.container))
            .await
    }

    /// Replaces the provisioned RU/s
    ///
    /// No client-side bounds checking; the service rejects out-of-range
    /// values with [`StoreError::InvalidThroughput`].
    pub async fn set_throughput(&self, request_units: i32) -> Result<ThroughputSetting> {
        tracing::info!(
            container = %self.container,
            request_units = request_units,
            "Replacing throughput"
        );

        self.with_deadline(
            self.transport
                .replace_throughput(&self.container, ThroughputSetting::new(request_units)),
        )
        .await
    }

    /// Applies the per-request deadline; elapsing surfaces as `Timeout` and
    /// drops the in-flight request
    async fn with_deadline<T>(&self, operation: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.request_timeout, operation).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.request_timeout)),
        }
    }
}
