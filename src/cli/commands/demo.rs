//! Demo command: the sales-order walkthrough
//!
//! Exercises every facade operation in sequence against the configured
//! container: scale throughput, create two orders, point read, read-all,
//! query by partition key, replace, upsert, delete, read-all again.

use crate::client::DocumentContainerClient;
use crate::config::DocStoreConfig;
use crate::domain::{Document, QuerySpec, Result, StoreError};
use crate::transport::{CosmosTransport, DocumentTransport, MemoryTransport};
use chrono::Utc;
use clap::Args;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Arguments for the demo command
#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Run against an in-process container instead of the remote service
    #[arg(long)]
    pub memory: bool,
}

impl DemoArgs {
    /// Execute the demo command, returning a process exit code
    pub async fn execute(&self, config: &DocStoreConfig) -> Result<i32> {
        let transport: Arc<dyn DocumentTransport> = if self.memory {
            // Seed explicit throughput so the scale step has an offer to read.
            Arc::new(MemoryTransport::with_initial_throughput(400))
        } else {
            Arc::new(CosmosTransport::new(&config.connection)?)
        };

        let client = connect_client(transport, config).await?;

        scale_container(&client).await?;
        create_orders(&client).await?;
        read_order(&client, "SalesOrder1", "Account1").await?;
        list_orders(&client, config.container.page_size).await?;
        query_orders(&client, "Account1").await?;
        replace_order(&client, "SalesOrder1", "Account1").await?;
        upsert_order(&client, "SalesOrder1", "Account1").await?;
        delete_order(&client, "SalesOrder1", "Account1").await?;
        delete_order(&client, "SalesOrder2", "Account2").await?;
        list_orders(&client, config.container.page_size).await?;

        println!("\nDemo complete");
        Ok(0)
    }
}

/// Connect to the configured container with the configured request deadline
async fn connect_client(
    transport: Arc<dyn DocumentTransport>,
    config: &DocStoreConfig,
) -> Result<DocumentContainerClient> {
    let client = DocumentContainerClient::connect(transport, &config.container)
        .await?
        .with_request_timeout(Duration::from_secs(config.connection.request_timeout_seconds));
    Ok(client)
}

/// Scale the container throughput up by 100 RU/s
///
/// Containers without explicit throughput (shared or autoscale) make this a
/// no-op rather than a failure.
async fn scale_container(client: &DocumentContainerClient) -> Result<()> {
    println!("\nScaling container\n");

    match client.get_throughput().await {
        Ok(setting) => {
            println!("Found offer, throughput is {setting}");
            let replaced = client
                .set_throughput(setting.increased_by(100).request_units())
                .await?;
            println!("Replaced offer, throughput is now {replaced}");
        }
        Err(StoreError::ThroughputNotConfigured { container }) => {
            println!("Cannot read throughput of container '{container}': none configured");
        }
        Err(e) => return Err(e),
    }

    Ok(())
}

async fn create_orders(client: &DocumentContainerClient) -> Result<()> {
    println!("\nCreating documents\n");

    for (id, account, subtotal) in [("SalesOrder1", "Account1", 100.0), ("SalesOrder2", "Account2", 200.0)] {
        let order = sales_order(id, account, subtotal)?;
        let stored = client.create_document(order).await?;
        println!("Created document '{}'", stored.id());
    }

    Ok(())
}

async fn read_order(client: &DocumentContainerClient, id: &str, account: &str) -> Result<()> {
    println!("\nReading document by id\n");

    let document = client.read_document(id, account.into()).await?;
    println!("Document read by id '{id}'");
    println!("Partition key: {account}");
    println!("Subtotal: {:?}", document.field("subtotal"));

    Ok(())
}

async fn list_orders(client: &DocumentContainerClient, page_size: usize) -> Result<()> {
    println!("\nReading all documents in the container\n");

    let documents = client.read_all_documents(page_size).await?.try_collect().await?;
    println!("Found {} documents", documents.len());
    for document in &documents {
        println!("Document id: {}", document.id());
    }

    Ok(())
}

async fn query_orders(client: &DocumentContainerClient, account: &str) -> Result<()> {
    println!("\nQuerying documents by partition key\n");

    let query = QuerySpec::new("SELECT * FROM r WHERE r.partitionKey = @account_number")
        .with_parameter("@account_number", account);
    let matches = client.query_documents(query).await?.try_collect().await?;

    match matches.first() {
        Some(document) => println!("Document queried by partition key: {}", document.id()),
        None => println!("No documents under partition key '{account}'"),
    }

    Ok(())
}

/// Read-modify-write: fetch, bump the subtotal, submit the whole document
async fn replace_order(client: &DocumentContainerClient, id: &str, account: &str) -> Result<()> {
    println!("\nReplacing a document\n");

    let mut document = client.read_document(id, account.into()).await?;
    let subtotal = subtotal_of(&document) + 1.0;
    document.set_field("subtotal", json!(subtotal));

    let replaced = client
        .replace_document(id, account.into(), document, None)
        .await?;
    println!(
        "Replaced document '{}', new subtotal {:?}",
        replaced.id(),
        replaced.field("subtotal")
    );

    Ok(())
}

async fn upsert_order(client: &DocumentContainerClient, id: &str, account: &str) -> Result<()> {
    println!("\nUpserting a document\n");

    let mut document = client.read_document(id, account.into()).await?;
    let subtotal = subtotal_of(&document) + 1.0;
    document.set_field("subtotal", json!(subtotal));

    let upserted = client.upsert_document(document).await?;
    println!(
        "Upserted document '{}', new subtotal {:?}",
        upserted.id(),
        upserted.field("subtotal")
    );

    Ok(())
}

async fn delete_order(client: &DocumentContainerClient, id: &str, account: &str) -> Result<()> {
    println!("\nDeleting document by id\n");

    client.delete_document(id, account.into()).await?;
    println!("Deleted document '{id}'");

    Ok(())
}

/// A sales order with nested properties and mixed value types; stored as-is
/// without any schema declared on the container
fn sales_order(id: &str, account: &str, subtotal: f64) -> Result<Document> {
    Document::from_value(json!({
        "id": id,
        "partitionKey": account,
        "purchase_order_number": format!("PO{id}"),
        "order_date": Utc::now().to_rfc3339(),
        "subtotal": subtotal,
        "tax_amount": subtotal * 0.08,
        "freight": 4.5,
        "items": [
            {
                "order_qty": 1,
                "product_code": "A-123",
                "unit_price": subtotal,
                "line_price": subtotal,
            }
        ],
    }))
}

fn subtotal_of(document: &Document) -> f64 {
    document
        .field("subtotal")
        .and_then(serde_json::Value::as_f64)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocStoreConfig;

    fn memory_config() -> DocStoreConfig {
        DocStoreConfig {
            application: Default::default(),
            connection: crate::config::ConnectionConfig {
                endpoint: "https://unused.example.com/".to_string(),
                key: crate::config::secret_string("unused".to_string()),
                request_timeout_seconds: 30,
            },
            container: Default::default(),
            logging: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_demo_runs_to_completion_in_memory() {
        let args = DemoArgs { memory: true };
        let exit = args.execute(&memory_config()).await.unwrap();
        assert_eq!(exit, 0);
    }

    #[tokio::test]
    async fn test_configured_timeout_reaches_client() {
        let mut config = memory_config();
        config.connection.request_timeout_seconds = 5;

        let transport: Arc<dyn DocumentTransport> = Arc::new(MemoryTransport::new());
        let client = connect_client(transport, &config).await.unwrap();
        assert_eq!(client.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_sales_order_fixture_shape() {
        let order = sales_order("SalesOrder1", "Account1", 100.0).unwrap();
        assert_eq!(order.id(), "SalesOrder1");
        assert_eq!(
            order.partition_key("/partitionKey").unwrap(),
            "Account1".into()
        );
        assert_eq!(subtotal_of(&order), 100.0);
    }
}
