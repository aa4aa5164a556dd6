//! Azure Cosmos DB transport implementation
//!
//! Translates [`DocumentTransport`] calls into `azure_data_cosmos` requests
//! and classifies service failures into the crate's error taxonomy. Service
//! status codes are matched in the SDK error text so vendor error types stay
//! out of the transport seam.

use crate::config::ConnectionConfig;
use crate::domain::{
    ContainerHandle, DatabaseHandle, Document, PartitionKeyValue, QuerySpec, Result, StoreError,
    ThroughputSetting,
};
use crate::transport::traits::{DocumentCursor, DocumentPage, DocumentTransport};
use async_trait::async_trait;
use azure_core::credentials::Secret;
use azure_core::http::response::ResponseBody;
use azure_data_cosmos::clients::ContainerClient;
use azure_data_cosmos::models::{
    ContainerProperties, PartitionKeyDefinition, PartitionKeyKind, ThroughputProperties,
};
use azure_data_cosmos::{CosmosClient, CosmosClientOptions, ItemOptions, PartitionKey, Query};
use futures::stream::{BoxStream, StreamExt};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::borrow::Cow;
use std::time::Duration;

/// Cosmos DB implementation of [`DocumentTransport`]
pub struct CosmosTransport {
    client: CosmosClient,
}

impl CosmosTransport {
    /// Creates a transport from validated connection settings
    ///
    /// No network call is made here; the first request happens on the first
    /// operation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Configuration`] if the SDK client cannot be
    /// constructed from the endpoint and key.
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let key: String = config.key.expose_secret().clone().into();
        let client = CosmosClient::with_key(
            &config.endpoint,
            Secret::new(key),
            Some(CosmosClientOptions::default()),
        )
        .map_err(|e| {
            StoreError::Configuration(format!("Failed to create Cosmos client: {e}"))
        })?;

        Ok(Self { client })
    }

    /// Probes connectivity by reading the given database
    pub async fn test_connection(&self, database_id: &str) -> Result<()> {
        self.client
            .database_client(database_id)
            .read(None)
            .await
            .map_err(|e| classify(&e.to_string(), ErrorContext::Read { id: database_id }))?;
        Ok(())
    }

    fn container_client(&self, container: &ContainerHandle) -> ContainerClient {
        self.client
            .database_client(container.database_id())
            .container_client(container.container_id())
    }
}

#[async_trait]
impl DocumentTransport for CosmosTransport {
    async fn ensure_database(&self, database_id: &str) -> Result<DatabaseHandle> {
        let database = self.client.database_client(database_id);

        match database.read(None).await {
            Ok(_) => {
                tracing::debug!(database = %database_id, "Database already exists");
            }
            Err(_) => {
                tracing::info!(database = %database_id, "Creating database");
                self.client
                    .create_database(database_id, None)
                    .await
                    .map_err(|e| {
                        classify(&e.to_string(), ErrorContext::Provision { id: database_id })
                    })?;
            }
        }

        Ok(DatabaseHandle::new(database_id))
    }

    async fn ensure_container(
        &self,
        database_id: &str,
        container_id: &str,
        partition_key_path: &str,
    ) -> Result<ContainerHandle> {
        let database = self.client.database_client(database_id);
        let container = database.container_client(container_id);

        match container.read(None).await {
            Ok(response) => {
                let properties: ContainerProperties = response.into_body().map_err(|e| {
                    StoreError::Serialization(format!(
                        "Failed to deserialize container properties: {e}"
                    ))
                })?;

                // Existing container with a different partition-key path is a
                // hard error, never silently reused.
                let existing = properties
                    .partition_key
                    .paths
                    .first()
                    .cloned()
                    .unwrap_or_default();
                if existing != partition_key_path {
                    return Err(StoreError::SchemaConflict {
                        container: container_id.to_string(),
                        existing,
                        requested: partition_key_path.to_string(),
                    });
                }

                tracing::debug!(container = %container_id, "Container already exists");
            }
            Err(_) => {
                tracing::info!(
                    container = %container_id,
                    partition_key_path = %partition_key_path,
                    "Creating container"
                );

                let properties = ContainerProperties {
                    id: Cow::Owned(container_id.to_string()),
                    partition_key: PartitionKeyDefinition {
                        paths: vec![partition_key_path.to_string()],
                        kind: PartitionKeyKind::Hash,
                        version: None,
                    },
                    ..Default::default()
                };

                database.create_container(properties, None).await.map_err(|e| {
                    classify(&e.to_string(), ErrorContext::Provision { id: container_id })
                })?;
            }
        }

        Ok(ContainerHandle::new(
            database_id,
            container_id,
            partition_key_path,
        ))
    }

    async fn create_document(
        &self,
        container: &ContainerHandle,
        document: Document,
    ) -> Result<Document> {
        let id = document.id().to_string();
        let partition_key = document.partition_key(container.partition_key_path())?;
        let client = self.container_client(container);

        let response = client
            .create_item(
                sdk_partition_key(&partition_key)?,
                document.to_value(),
                Some(content_response_options()),
            )
            .await
            .map_err(|e| classify(&e.to_string(), ErrorContext::Write { id: &id }))?;

        stored_or_submitted(response.into_raw_body(), document)
    }

    async fn read_document(
        &self,
        container: &ContainerHandle,
        id: &str,
        partition_key: &PartitionKeyValue,
    ) -> Result<Document> {
        let client = self.container_client(container);

        let response = client
            .read_item::<Value>(sdk_partition_key(partition_key)?, id, None)
            .await
            .map_err(|e| classify(&e.to_string(), ErrorContext::Read { id }))?;

        let body = response.into_body().map_err(|e| {
            StoreError::Serialization(format!("Failed to deserialize document: {e}"))
        })?;
        Document::from_value(body)
    }

    async fn replace_document(
        &self,
        container: &ContainerHandle,
        id: &str,
        partition_key: &PartitionKeyValue,
        document: Document,
        expected_version: Option<&str>,
    ) -> Result<Document> {
        let client = self.container_client(container);

        let mut options = content_response_options();
        if let Some(etag) = expected_version {
            options.if_match_etag = Some(etag.to_string().into());
        }

        let response = client
            .replace_item(
                sdk_partition_key(partition_key)?,
                id,
                document.to_value(),
                Some(options),
            )
            .await
            .map_err(|e| classify(&e.to_string(), ErrorContext::Write { id }))?;

        stored_or_submitted(response.into_raw_body(), document)
    }

    async fn upsert_document(
        &self,
        container: &ContainerHandle,
        document: Document,
    ) -> Result<Document> {
        let id = document.id().to_string();
        let partition_key = document.partition_key(container.partition_key_path())?;
        let client = self.container_client(container);

        let response = client
            .upsert_item(
                sdk_partition_key(&partition_key)?,
                document.to_value(),
                Some(content_response_options()),
            )
            .await
            .map_err(|e| classify(&e.to_string(), ErrorContext::Write { id: &id }))?;

        stored_or_submitted(response.into_raw_body(), document)
    }

    async fn delete_document(
        &self,
        container: &ContainerHandle,
        id: &str,
        partition_key: &PartitionKeyValue,
    ) -> Result<()> {
        let client = self.container_client(container);

        client
            .delete_item(sdk_partition_key(partition_key)?, id, None)
            .await
            .map_err(|e| classify(&e.to_string(), ErrorContext::Write { id }))?;

        Ok(())
    }

    async fn read_all_documents(
        &self,
        container: &ContainerHandle,
        page_size: usize,
    ) -> Result<Box<dyn DocumentCursor>> {
        // The service has no dedicated list call in this SDK; an unfiltered
        // cross-partition query is the read-all path.
        self.query_documents(container, &QuerySpec::new("SELECT * FROM c"), page_size)
            .await
    }

    async fn query_documents(
        &self,
        container: &ContainerHandle,
        query: &QuerySpec,
        page_size: usize,
    ) -> Result<Box<dyn DocumentCursor>> {
        let client = self.container_client(container);

        let mut sdk_query = Query::from(query.text().to_string());
        for parameter in query.parameters() {
            sdk_query = sdk_query
                .with_parameter(&parameter.name, parameter.value.clone())
                .map_err(|e| {
                    StoreError::Serialization(format!(
                        "Failed to bind query parameter '{}': {e}",
                        parameter.name
                    ))
                })?;
        }

        // Cross-partition query; partition scoping belongs in the filter text.
        let items = client
            .query_items::<Value>(sdk_query, (), None)
            .map_err(|e| classify(&e.to_string(), ErrorContext::Query))?;

        Ok(Box::new(CosmosCursor {
            items: items.boxed(),
            page_size: page_size.max(1),
            exhausted: false,
        }))
    }

    async fn read_throughput(&self, container: &ContainerHandle) -> Result<ThroughputSetting> {
        let client = self.container_client(container);

        let response = client.read_throughput(None).await.map_err(|e| {
            classify_throughput_read(&e.to_string(), container.container_id())
        })?;

        let properties = match response {
            Some(response) => response.into_body().map_err(|e| {
                StoreError::Serialization(format!("Failed to deserialize throughput: {e}"))
            })?,
            // Shared provisioning: no offer resource on the container at all.
            None => {
                return Err(StoreError::ThroughputNotConfigured {
                    container: container.container_id().to_string(),
                })
            }
        };

        match properties.throughput() {
            Some(request_units) => Ok(ThroughputSetting::new(request_units_i32(request_units))),
            // Autoscale provisioning: the offer carries no manual value.
            None => Err(StoreError::ThroughputNotConfigured {
                container: container.container_id().to_string(),
            }),
        }
    }

    async fn replace_throughput(
        &self,
        container: &ContainerHandle,
        setting: ThroughputSetting,
    ) -> Result<ThroughputSetting> {
        let client = self.container_client(container);

        let requested = usize::try_from(setting.request_units()).map_err(|_| {
            StoreError::InvalidThroughput(format!(
                "throughput must be positive, got {} RU/s",
                setting.request_units()
            ))
        })?;

        let properties = ThroughputProperties::manual(requested);
        let response = client
            .replace_throughput(properties, None)
            .await
            .map_err(|e| classify(&e.to_string(), ErrorContext::Throughput))?;

        let replaced: ThroughputProperties = response.into_body().map_err(|e| {
            StoreError::Serialization(format!("Failed to deserialize throughput: {e}"))
        })?;

        Ok(replaced
            .throughput()
            .map(|units| ThroughputSetting::new(request_units_i32(units)))
            .unwrap_or(setting))
    }
}

/// Cursor chunking the SDK's item stream into fixed-size pages
///
/// The SDK pages internally with continuation tokens; dropping this cursor
/// drops the stream and with it any held continuation state.
struct CosmosCursor {
    items: BoxStream<'static, azure_core::Result<Value>>,
    page_size: usize,
    exhausted: bool,
}

#[async_trait]
impl DocumentCursor for CosmosCursor {
    async fn next_page(&mut self) -> Result<Option<DocumentPage>> {
        if self.exhausted {
            return Ok(None);
        }

        let mut documents = Vec::with_capacity(self.page_size);
        while documents.len() < self.page_size {
            match self.items.next().await {
                Some(Ok(value)) => documents.push(Document::from_value(value)?),
                Some(Err(e)) => {
                    return Err(classify(&e.to_string(), ErrorContext::Query));
                }
                None => {
                    self.exhausted = true;
                    break;
                }
            }
        }

        if documents.is_empty() {
            Ok(None)
        } else {
            Ok(Some(DocumentPage { documents }))
        }
    }
}

/// Converts a domain partition-key value into the SDK's wire form
///
/// The SDK accepts strings, numbers, and null. Booleans have no SDK
/// representation, and the SDK panics on non-finite floats, so both are
/// rejected here instead.
fn sdk_partition_key(value: &PartitionKeyValue) -> Result<PartitionKey> {
    match value {
        PartitionKeyValue::String(s) => Ok(PartitionKey::from(s.clone())),
        PartitionKeyValue::Int(n) => Ok(PartitionKey::from(*n)),
        PartitionKeyValue::Float(n) if n.is_finite() => Ok(PartitionKey::from(*n)),
        PartitionKeyValue::Float(_) => Err(StoreError::InvalidDocument(
            "partition-key number must be finite".to_string(),
        )),
        PartitionKeyValue::Bool(_) => Err(StoreError::InvalidDocument(
            "boolean partition keys are not supported by the Cosmos service".to_string(),
        )),
        PartitionKeyValue::Null => Ok(PartitionKey::NULL.into()),
    }
}

fn content_response_options() -> ItemOptions<'static> {
    ItemOptions {
        enable_content_response_on_write: true,
        ..Default::default()
    }
}

/// Prefer the server-returned body (system metadata merged in); fall back to
/// the submitted document when the service omitted the write body.
fn stored_or_submitted(body: ResponseBody, submitted: Document) -> Result<Document> {
    if body.is_empty() {
        return Ok(submitted);
    }
    let value: Value = body.json().map_err(|e| {
        StoreError::Serialization(format!("Failed to deserialize write response: {e}"))
    })?;
    Document::from_value(value)
}

/// Clamps the SDK's `usize` throughput to the domain's `i32` RU/s
fn request_units_i32(units: usize) -> i32 {
    i32::try_from(units).unwrap_or(i32::MAX)
}

enum ErrorContext<'a> {
    Read { id: &'a str },
    Write { id: &'a str },
    Provision { id: &'a str },
    Query,
    Throughput,
}

/// Classifies an SDK error by the status code embedded in its message
///
/// Matching on the message text keeps SDK error types out of the seam; the
/// status phrases are stable service-side strings.
fn classify(message: &str, context: ErrorContext<'_>) -> StoreError {
    if message.contains("404") || message.contains("NotFound") {
        if let ErrorContext::Read { id } | ErrorContext::Write { id } = context {
            return StoreError::NotFound { id: id.to_string() };
        }
    }
    if message.contains("409") || message.contains("Conflict") {
        if let ErrorContext::Write { id } | ErrorContext::Provision { id } = context {
            return StoreError::AlreadyExists { id: id.to_string() };
        }
    }
    if message.contains("412") || message.contains("PreconditionFailed") {
        if let ErrorContext::Write { id } = context {
            return StoreError::VersionConflict { id: id.to_string() };
        }
    }
    if message.contains("429")
        || message.contains("TooManyRequests")
        || message.contains("Request rate is large")
    {
        return StoreError::Throttled {
            retry_after: parse_retry_after(message),
        };
    }
    if matches!(context, ErrorContext::Throughput) && message.contains("400") {
        return StoreError::InvalidThroughput(message.to_string());
    }
    StoreError::Transport {
        status: parse_status(message),
        message: message.to_string(),
    }
}

/// Throughput reads classify narrowly: only the 400-class "offer not found"
/// response means the container has no explicit throughput. Everything else
/// propagates unchanged.
fn classify_throughput_read(message: &str, container_id: &str) -> StoreError {
    if message.contains("400") || message.contains("404") {
        return StoreError::ThroughputNotConfigured {
            container: container_id.to_string(),
        };
    }
    classify(message, ErrorContext::Throughput)
}

/// Pulls the first three-digit HTTP status out of an SDK error message
fn parse_status(message: &str) -> Option<u16> {
    let bytes = message.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            // An exact three-digit run in the 1xx-5xx range is a status code.
            if i - start == 3 {
                if let Ok(status) = message[start..i].parse::<u16>() {
                    if (100..=599).contains(&status) {
                        return Some(status);
                    }
                }
            }
        } else {
            i += 1;
        }
    }
    None
}

/// Extracts a `retry-after-ms` or `x-ms-retry-after-ms` hint when the service
/// echoed one into the error message
fn parse_retry_after(message: &str) -> Option<Duration> {
    let lower = message.to_lowercase();
    let idx = lower.find("retry-after-ms")?;
    let rest = &lower[idx..];
    let digits: String = rest
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<u64>().ok().map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_not_found_on_read() {
        let err = classify("HTTP status 404 NotFound", ErrorContext::Read { id: "d1" });
        assert!(matches!(err, StoreError::NotFound { id } if id == "d1"));
    }

    #[test]
    fn test_classify_conflict_on_write() {
        let err = classify("409 Conflict", ErrorContext::Write { id: "d1" });
        assert!(matches!(err, StoreError::AlreadyExists { id } if id == "d1"));
    }

    #[test]
    fn test_classify_precondition_failed() {
        let err = classify("412 PreconditionFailed", ErrorContext::Write { id: "d1" });
        assert!(matches!(err, StoreError::VersionConflict { .. }));
    }

    #[test]
    fn test_classify_throttled_with_hint() {
        let err = classify(
            "429 TooManyRequests, x-ms-retry-after-ms: 1500",
            ErrorContext::Write { id: "d1" },
        );
        match err {
            StoreError::Throttled { retry_after } => {
                assert_eq!(retry_after, Some(Duration::from_millis(1500)));
            }
            other => panic!("expected Throttled, got {other}"),
        }
    }

    #[test]
    fn test_classify_unknown_is_transport_with_status() {
        let err = classify("503 Service Unavailable", ErrorContext::Query);
        match err {
            StoreError::Transport { status, .. } => assert_eq!(status, Some(503)),
            other => panic!("expected Transport, got {other}"),
        }
    }

    #[test]
    fn test_throughput_read_400_is_not_configured() {
        let err = classify_throughput_read("400 BadRequest: offer not found", "orders");
        assert!(matches!(
            err,
            StoreError::ThroughputNotConfigured { container } if container == "orders"
        ));
    }

    #[test]
    fn test_throughput_read_other_errors_propagate() {
        let err = classify_throughput_read("503 Service Unavailable", "orders");
        assert!(matches!(err, StoreError::Transport { .. }));
    }

    #[test]
    fn test_parse_status_ignores_longer_numbers() {
        assert_eq!(parse_status("request 1234 failed"), None);
        assert_eq!(parse_status("status 404"), Some(404));
    }

    #[test]
    fn test_classify_request_timeout_keeps_status() {
        // Service-side 408s carry no deadline of ours; they stay transport
        // errors with the status attached rather than a zero-length timeout.
        let err = classify("408 RequestTimeout", ErrorContext::Read { id: "d1" });
        match err {
            StoreError::Transport { status, .. } => assert_eq!(status, Some(408)),
            other => panic!("expected Transport, got {other}"),
        }
    }

    #[test]
    fn test_sdk_partition_key_rejects_booleans() {
        let err = sdk_partition_key(&PartitionKeyValue::Bool(true)).unwrap_err();
        assert!(matches!(err, StoreError::InvalidDocument(_)));
    }

    #[test]
    fn test_sdk_partition_key_rejects_non_finite_floats() {
        assert!(sdk_partition_key(&PartitionKeyValue::Float(f64::NAN)).is_err());
        assert!(sdk_partition_key(&PartitionKeyValue::Float(1.5)).is_ok());
    }
}
