//! Rate-limited client for the CRPT document API.
//!
//! [`DocumentClient`] encodes a [`Document`] to the API's JSON schema, waits for
//! a permit from its fixed-window [`RateLimiter`], signs the payload with a
//! caller-supplied [`Sign`] implementation and posts it to
//! [`SUBMISSION_ENDPOINT`]. Each submission returns a [`SubmissionHandle`] that
//! resolves to the endpoint's response.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use crpt_client::{Document, DocumentClient, PassThrough};
//!
//! # async fn run(document: Document) -> crpt_client::Result<()> {
//! let client = DocumentClient::new(Duration::from_secs(1), 10)?;
//! let response = client.submit(&document, PassThrough).await?;
//! println!("{}", response.body);
//! client.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod document;
pub mod error;
pub mod executor;
pub mod limiter;
pub mod sign;
pub mod transport;

use std::result::Result as StdResult;

use reqwest::{Client as ReqwestClient, Request};

pub use client::{Config, DocumentClient, ShutdownPolicy};
pub use document::{Description, Document, Product};
pub use error::Error;
pub use executor::SubmissionHandle;
pub use limiter::{Permit, RateLimiter};
pub use sign::{PassThrough, Sign};
pub use transport::{HttpTransport, Response, SubmissionRequest, Transport};

pub type Result<T> = StdResult<T, Error>;

/// Document creation endpoint of the CRPT API. All submissions are `POST`ed here.
pub const SUBMISSION_ENDPOINT: &str = "https://ismp.crpt.ru/api/v3/lk/documents/create";

/// Executes `request` and maps non-successful statuses to [`error::Kind::Status`].
async fn request(client: &ReqwestClient, request: Request) -> Result<Response> {
    let method = request.method().clone();
    let path = request.url().path().to_owned();

    let response = client.execute(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.text().await?;

    if !status.is_success() {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            status = %status,
            method = %method,
            path = %path,
            message = %body,
            "document submission rejected"
        );
        return Err(Error::status(status, method, path, body));
    }

    Ok(Response {
        status,
        headers,
        body,
    })
}
