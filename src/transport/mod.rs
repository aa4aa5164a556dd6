//! Transport implementations
//!
//! The facade talks to the database service only through the
//! [`DocumentTransport`] trait:
//!
//! - [`cosmos`] - Azure Cosmos DB implementation
//! - [`memory`] - deterministic in-process implementation for tests and demos
//!
//! Transports classify service failures into
//! [`StoreError`](crate::domain::StoreError) variants and never leak vendor
//! SDK types across the seam.

pub mod cosmos;
pub mod memory;
pub mod traits;

pub use cosmos::CosmosTransport;
pub use memory::MemoryTransport;
pub use traits::{DocumentCursor, DocumentPage, DocumentTransport};
