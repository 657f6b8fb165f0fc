#![allow(dead_code, reason = "not every test binary uses every fixture")]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use crpt_client::error::Error;
use crpt_client::{Description, Document, Product, Response, SubmissionRequest, Transport};
use reqwest::{Method, StatusCode};
use tokio::time::Instant;
use uuid::Uuid;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn product(uit: &str) -> Product {
    Product::builder()
        .certificate_document("CONFORMITY_CERTIFICATE")
        .certificate_document_date(date(2023, 11, 2))
        .certificate_document_number("RU-C-77.001")
        .owner_inn("7701234567")
        .producer_inn("7707654321")
        .production_date(date(2024, 3, 1))
        .tnved_code("6403990000")
        .uit_code(uit)
        .uitu_code(format!("{uit}-GROUP"))
        .build()
}

pub fn document(id: &str) -> Document {
    Document::builder()
        .description(Description::new("7701234567"))
        .document_id(id)
        .document_status("CHECKED_OK")
        .document_type("LP_INTRODUCE_GOODS")
        .import_request(false)
        .owner_inn("7701234567")
        .participant_inn("7701234567")
        .producer_inn("7707654321")
        .production_date(date(2024, 3, 1))
        .production_type("OWN_PRODUCTION")
        .products(vec![product("0104600439931256"), product("0104600439931257")])
        .registration_date(date(2024, 3, 5))
        .registration_number(format!("REG-{id}"))
        .build()
}

#[derive(Clone, Debug)]
pub struct Sent {
    pub at: Instant,
    pub id: Uuid,
    pub body: Vec<u8>,
}

/// Records every request it is asked to send and answers `200 OK`.
#[derive(Clone, Debug, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<Sent>>>,
    latency: Duration,
}

impl RecordingTransport {
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: SubmissionRequest) -> crpt_client::Result<Response> {
        self.sent.lock().unwrap().push(Sent {
            at: Instant::now(),
            id: request.id,
            body: request.body,
        });
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        Ok(Response::new(StatusCode::OK, format!(r#"{{"value":"{}"}}"#, request.id)))
    }
}

/// Rejects every request with the given status.
#[derive(Clone, Copy, Debug)]
pub struct RejectingTransport(pub StatusCode);

#[async_trait]
impl Transport for RejectingTransport {
    async fn send(&self, _request: SubmissionRequest) -> crpt_client::Result<Response> {
        Err(Error::status(
            self.0,
            Method::POST,
            "/api/v3/lk/documents/create".to_owned(),
            "rejected",
        ))
    }
}
