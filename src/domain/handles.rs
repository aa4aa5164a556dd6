//! Handles identifying a database and a container
//!
//! Handles carry identity only. They are produced by the idempotent
//! `ensure_*` operations and held for the process lifetime; the partition-key
//! path on a [`ContainerHandle`] is fixed at container creation and never
//! changes afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a logical database
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatabaseHandle {
    database_id: String,
}

impl DatabaseHandle {
    pub fn new(database_id: impl Into<String>) -> Self {
        Self {
            database_id: database_id.into(),
        }
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }
}

impl fmt::Display for DatabaseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.database_id)
    }
}

/// Identity of a (database, container) pair plus its partition-key path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerHandle {
    database_id: String,
    container_id: String,
    partition_key_path: String,
}

impl ContainerHandle {
    pub fn new(
        database_id: impl Into<String>,
        container_id: impl Into<String>,
        partition_key_path: impl Into<String>,
    ) -> Self {
        Self {
            database_id: database_id.into(),
            container_id: container_id.into(),
            partition_key_path: partition_key_path.into(),
        }
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    /// The container's partition-key path, e.g. `/partitionKey`
    pub fn partition_key_path(&self) -> &str {
        &self.partition_key_path
    }
}

impl fmt::Display for ContainerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.database_id, self.container_id)
    }
}
