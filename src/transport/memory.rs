//! In-process transport implementation
//!
//! A deterministic [`DocumentTransport`] backed by an in-memory map, used by
//! the integration tests and runnable demos. It honors the same contract as
//! the Cosmos transport: partition-scoped point operations, etag versioning,
//! paged sequences with continuation state, and the throughput read/replace
//! pair.
//!
//! Queries support the single-equality filter shape
//! (`WHERE c.<field> = @param`) that partition-scoped lookups use; anything
//! richer belongs to the real service.

use crate::domain::{
    ContainerHandle, DatabaseHandle, Document, PartitionKeyValue, QuerySpec, Result, StoreError,
    ThroughputSetting,
};
use crate::transport::traits::{DocumentCursor, DocumentPage, DocumentTransport};
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Key ordering documents within a container: partition scope, then id
type DocumentKey = (String, String);

#[derive(Debug, Default)]
struct ContainerState {
    partition_key_path: String,
    documents: BTreeMap<DocumentKey, Value>,
    throughput: Option<i32>,
}

#[derive(Debug, Default)]
struct AccountState {
    databases: BTreeSet<String>,
    containers: BTreeMap<(String, String), ContainerState>,
}

/// In-memory implementation of [`DocumentTransport`]
///
/// Cloning is cheap and clones share state, mirroring how SDK clients share
/// one connection pool.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    state: Arc<RwLock<AccountState>>,
    initial_throughput: Option<i32>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// New containers start with this explicit manual throughput, matching a
    /// container provisioned with dedicated RU/s
    pub fn with_initial_throughput(request_units: i32) -> Self {
        Self {
            state: Arc::default(),
            initial_throughput: Some(request_units),
        }
    }

    async fn with_container<T>(
        &self,
        container: &ContainerHandle,
        f: impl FnOnce(&mut ContainerState) -> Result<T>,
    ) -> Result<T> {
        let mut state = self.state.write().await;
        let key = (
            container.database_id().to_string(),
            container.container_id().to_string(),
        );
        let container_state = state.containers.get_mut(&key).ok_or_else(|| {
            StoreError::transport(format!("container '{container}' does not exist"))
        })?;
        f(container_state)
    }

    fn document_key(
        container: &ContainerState,
        document: &Document,
    ) -> Result<(DocumentKey, PartitionKeyValue)> {
        let partition_key = document.partition_key(&container.partition_key_path)?;
        let key = (partition_key.canonical(), document.id().to_string());
        Ok((key, partition_key))
    }
}

#[async_trait]
impl DocumentTransport for MemoryTransport {
    async fn ensure_database(&self, database_id: &str) -> Result<DatabaseHandle> {
        let mut state = self.state.write().await;
        state.databases.insert(database_id.to_string());
        Ok(DatabaseHandle::new(database_id))
    }

    async fn ensure_container(
        &self,
        database_id: &str,
        container_id: &str,
        partition_key_path: &str,
    ) -> Result<ContainerHandle> {
        let mut state = self.state.write().await;
        if !state.databases.contains(database_id) {
            return Err(StoreError::transport(format!(
                "database '{database_id}' does not exist"
            )));
        }

        let key = (database_id.to_string(), container_id.to_string());
        match state.containers.get(&key) {
            Some(existing) if existing.partition_key_path != partition_key_path => {
                return Err(StoreError::SchemaConflict {
                    container: container_id.to_string(),
                    existing: existing.partition_key_path.clone(),
                    requested: partition_key_path.to_string(),
                });
            }
            Some(_) => {}
            None => {
                state.containers.insert(
                    key,
                    ContainerState {
                        partition_key_path: partition_key_path.to_string(),
                        documents: BTreeMap::new(),
                        throughput: self.initial_throughput,
                    },
                );
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
        self.with_container(container, |state| {
            let (key, _) = Self::document_key(state, &document)?;
            if state.documents.contains_key(&key) {
                return Err(StoreError::AlreadyExists {
                    id: document.id().to_string(),
                });
            }
            let stored = stamp_version(document);
            state.documents.insert(key, stored.to_value());
            Ok(stored)
        })
        .await
    }

    async fn read_document(
        &self,
        container: &ContainerHandle,
        id: &str,
        partition_key: &PartitionKeyValue,
    ) -> Result<Document> {
        let key = (partition_key.canonical(), id.to_string());
        self.with_container(container, |state| {
            let value = state
                .documents
                .get(&key)
                .cloned()
                .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
            Document::from_value(value)
        })
        .await
    }

    async fn replace_document(
        &self,
        container: &ContainerHandle,
        id: &str,
        partition_key: &PartitionKeyValue,
        document: Document,
        expected_version: Option<&str>,
    ) -> Result<Document> {
        let key = (partition_key.canonical(), id.to_string());
        self.with_container(container, |state| {
            let existing = state
                .documents
                .get(&key)
                .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

            if let Some(expected) = expected_version {
                let current = existing.get("_etag").and_then(Value::as_str);
                if current != Some(expected) {
                    return Err(StoreError::VersionConflict { id: id.to_string() });
                }
            }

            let stored = stamp_version(document);
            state.documents.insert(key, stored.to_value());
            Ok(stored)
        })
        .await
    }

    async fn upsert_document(
        &self,
        container: &ContainerHandle,
        document: Document,
    ) -> Result<Document> {
        self.with_container(container, |state| {
            let (key, _) = Self::document_key(state, &document)?;
            let stored = stamp_version(document);
            state.documents.insert(key, stored.to_value());
            Ok(stored)
        })
        .await
    }

    async fn delete_document(
        &self,
        container: &ContainerHandle,
        id: &str,
        partition_key: &PartitionKeyValue,
    ) -> Result<()> {
        let key = (partition_key.canonical(), id.to_string());
        self.with_container(container, |state| {
            state
                .documents
                .remove(&key)
                .map(|_| ())
                .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
        })
        .await
    }

    async fn read_all_documents(
        &self,
        container: &ContainerHandle,
        page_size: usize,
    ) -> Result<Box<dyn DocumentCursor>> {
        Ok(Box::new(MemoryCursor {
            state: Arc::clone(&self.state),
            container: container.clone(),
            filter: None,
            page_size: page_size.max(1),
            continuation: None,
            exhausted: false,
        }))
    }

    async fn query_documents(
        &self,
        container: &ContainerHandle,
        query: &QuerySpec,
        page_size: usize,
    ) -> Result<Box<dyn DocumentCursor>> {
        let filter = EqualityFilter::parse(query)?;
        Ok(Box::new(MemoryCursor {
            state: Arc::clone(&self.state),
            container: container.clone(),
            filter,
            page_size: page_size.max(1),
            continuation: None,
            exhausted: false,
        }))
    }

    async fn read_throughput(&self, container: &ContainerHandle) -> Result<ThroughputSetting> {
        let container_id = container.container_id().to_string();
        self.with_container(container, |state| {
            state
                .throughput
                .map(ThroughputSetting::new)
                .ok_or(StoreError::ThroughputNotConfigured {
                    container: container_id,
                })
        })
        .await
    }

    async fn replace_throughput(
        &self,
        container: &ContainerHandle,
        setting: ThroughputSetting,
    ) -> Result<ThroughputSetting> {
        // The service floor for manual provisioning.
        if setting.request_units() < 400 {
            return Err(StoreError::InvalidThroughput(format!(
                "throughput {} RU/s is below the 400 RU/s minimum",
                setting.request_units()
            )));
        }
        self.with_container(container, |state| {
            state.throughput = Some(setting.request_units());
            Ok(setting)
        })
        .await
    }
}

/// Writes get a fresh version tag, as the service does on every mutation
fn stamp_version(mut document: Document) -> Document {
    document.set_field("_etag", Value::String(uuid::Uuid::new_v4().to_string()));
    document
}

/// The single-equality filter shape supported by this backend
struct EqualityFilter {
    field_path: String,
    value: Value,
}

impl EqualityFilter {
    /// Parses `SELECT ... WHERE c.<field> = @param`; `None` means no filter
    fn parse(query: &QuerySpec) -> Result<Option<Self>> {
        let text = query.text();
        if !text.to_uppercase().contains("WHERE") {
            return Ok(None);
        }

        let pattern = Regex::new(r"(?i)WHERE\s+\w+\.([A-Za-z0-9_./]+)\s*=\s*(@[A-Za-z0-9_]+)")
            .expect("filter pattern is valid");
        let captures = pattern.captures(text).ok_or_else(|| {
            StoreError::transport(format!(
                "memory transport supports only single-equality filters, got: {text}"
            ))
        })?;

        let field_path = captures[1].replace('/', ".");
        let parameter_name = &captures[2];
        let value = query.parameter(parameter_name).cloned().ok_or_else(|| {
            StoreError::transport(format!("query parameter '{parameter_name}' is not bound"))
        })?;

        Ok(Some(Self { field_path, value }))
    }

    fn matches(&self, document: &Value) -> bool {
        let mut current = document;
        for segment in self.field_path.split('.') {
            match current.get(segment) {
                Some(next) => current = next,
                None => return false,
            }
        }
        current == &self.value
    }
}

/// Cursor over the live container map, resuming after the last-seen key
///
/// The continuation state is the last delivered (partition scope, id) pair;
/// each page re-reads the shared map, so the cursor observes writes committed
/// between pulls, as a service-side continuation token does.
struct MemoryCursor {
    state: Arc<RwLock<AccountState>>,
    container: ContainerHandle,
    filter: Option<EqualityFilter>,
    page_size: usize,
    continuation: Option<DocumentKey>,
    exhausted: bool,
}

#[async_trait]
impl DocumentCursor for MemoryCursor {
    async fn next_page(&mut self) -> Result<Option<DocumentPage>> {
        if self.exhausted {
            return Ok(None);
        }

        let state = self.state.read().await;
        let key = (
            self.container.database_id().to_string(),
            self.container.container_id().to_string(),
        );
        let container = state.containers.get(&key).ok_or_else(|| {
            StoreError::transport(format!("container '{}' does not exist", self.container))
        })?;

        let mut documents = Vec::new();
        let range = match &self.continuation {
            Some(last) => container
                .documents
                .range((
                    std::ops::Bound::Excluded(last.clone()),
                    std::ops::Bound::Unbounded,
                )),
            None => container.documents.range(..),
        };

        let mut last_key = None;
        for (doc_key, value) in range {
            last_key = Some(doc_key.clone());
            if self
                .filter
                .as_ref()
                .map(|f| f.matches(value))
                .unwrap_or(true)
            {
                documents.push(Document::from_value(value.clone())?);
                if documents.len() == self.page_size {
                    break;
                }
            }
        }

        match last_key {
            Some(key) => self.continuation = Some(key),
            None => self.exhausted = true,
        }

        if documents.is_empty() {
            // A scanned-but-filtered page keeps going until the map is done.
            if self.exhausted {
                Ok(None)
            } else {
                drop(state);
                self.next_page().await
            }
        } else {
            Ok(Some(DocumentPage { documents }))
        }
    }
}
