//! Submits a handful of documents through a client limited to 2 requests per second.
//!
//! Run with `RUST_LOG=crpt_client=debug,submit=info cargo run --example submit`.

use std::result::Result as StdResult;
use std::time::Duration;

use chrono::NaiveDate;
use crpt_client::error::BoxError;
use crpt_client::{Description, Document, DocumentClient, Product};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn document(id: usize) -> anyhow::Result<Document> {
    let date = |y, m, d| {
        NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| anyhow::anyhow!("invalid date"))
    };

    Ok(Document::builder()
        .description(Description::new("7701234567"))
        .document_id(format!("demo-{id}"))
        .document_status("DRAFT")
        .document_type("LP_INTRODUCE_GOODS")
        .import_request(false)
        .owner_inn("7701234567")
        .participant_inn("7701234567")
        .producer_inn("7701234567")
        .production_date(date(2024, 5, 1)?)
        .production_type("OWN_PRODUCTION")
        .products(vec![
            Product::builder()
                .certificate_document("CONFORMITY_CERTIFICATE")
                .certificate_document_date(date(2024, 4, 1)?)
                .certificate_document_number("RU-DEMO-1")
                .owner_inn("7701234567")
                .producer_inn("7701234567")
                .production_date(date(2024, 5, 1)?)
                .tnved_code("6403990000")
                .uit_code(format!("0104600439931256{id:04}"))
                .uitu_code(format!("1460043993125{id:05}"))
                .build(),
        ])
        .registration_date(date(2024, 5, 2)?)
        .registration_number(format!("REG-{id}"))
        .build())
}

// Stand-in for a detached signature produced by a crypto provider.
fn sign(document: &[u8]) -> StdResult<Vec<u8>, BoxError> {
    Ok(document.to_vec())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = DocumentClient::new(Duration::from_secs(1), 2)?;

    let mut handles = Vec::new();
    for id in 0..5 {
        handles.push(client.submit(&document(id)?, sign));
    }

    for handle in handles {
        let id = handle.id();
        match handle.await {
            Ok(response) => info!(%id, status = %response.status, body = %response.body, "submitted"),
            Err(e) => warn!(%id, kind = %e.kind(), error = %e, "submission failed"),
        }
    }

    client.shutdown();
    client.closed().await;
    Ok(())
}
