// docstore - Azure Cosmos DB document container client
// Licensed under the MIT License

//! # docstore - typed document container client
//!
//! docstore is a small client library over Azure Cosmos DB (NoSQL API) that
//! binds to one container and exposes typed, partition-aware document
//! operations: point reads and writes, lazy paged enumeration, parameterized
//! queries, and provisioned-throughput management.
//!
//! ## Architecture
//!
//! The crate follows a layered architecture:
//!
//! - [`cli`] - Command-line demonstration driver
//! - [`client`] - The [`DocumentContainerClient`](client::DocumentContainerClient) facade
//! - [`transport`] - Wire backends behind the
//!   [`DocumentTransport`](transport::DocumentTransport) trait: the Cosmos DB
//!   SDK and an in-process store for tests
//! - [`domain`] - Documents, partition keys, queries, errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docstore::client::DocumentContainerClient;
//! use docstore::config::load_config;
//! use docstore::domain::Document;
//! use docstore::transport::CosmosTransport;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> docstore::domain::Result<()> {
//!     let config = load_config("docstore.toml")?;
//!     let transport = Arc::new(CosmosTransport::new(&config.connection)?);
//!     let client = DocumentContainerClient::connect(transport, &config.container).await?;
//!
//!     let order = Document::from_value(json!({
//!         "id": "SalesOrder1",
//!         "partitionKey": "Account1",
//!         "subtotal": 100.0,
//!     }))?;
//!     let stored = client.create_document(order).await?;
//!     println!("Created '{}'", stored.id());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`domain::StoreError`], which separates
//! caller mistakes (`NotFound`, `AlreadyExists`, `VersionConflict`) from
//! transient service conditions (`Throttled`, `Timeout`) so callers can
//! branch or retry without parsing messages:
//!
//! ```rust,no_run
//! use docstore::domain::StoreError;
//!
//! # async fn example(client: &docstore::client::DocumentContainerClient) {
//! match client.read_document("SalesOrder1", "Account1".into()).await {
//!     Ok(order) => println!("subtotal: {:?}", order.field("subtotal")),
//!     Err(StoreError::NotFound { id }) => println!("'{id}' does not exist"),
//!     Err(e) => eprintln!("read failed: {e}"),
//! }
//! # }
//! ```
//!
//! ## Logging
//!
//! docstore logs with the `tracing` crate; every operation carries the
//! container, document id, and partition key as structured fields.

pub mod cli;
pub mod client;
pub mod config;
pub mod domain;
pub mod logging;
pub mod transport;
