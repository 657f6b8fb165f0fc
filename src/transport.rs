//! HTTP boundary: one `POST` of the signed payload to the submission endpoint.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Method, StatusCode};
use url::Url;
use uuid::Uuid;

use crate::{Result, SUBMISSION_ENDPOINT};

/// A signed payload ready to be posted.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubmissionRequest {
    /// Identifier of the submission this request belongs to.
    pub id: Uuid,
    pub body: Vec<u8>,
}

impl SubmissionRequest {
    #[must_use]
    pub fn new(id: Uuid, body: Vec<u8>) -> Self {
        Self { id, body }
    }
}

/// Successful response of the submission endpoint.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl Response {
    #[must_use]
    pub fn new<S: Into<String>>(status: StatusCode, body: S) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

/// Sends submission requests to the remote endpoint.
///
/// Implementations report network failures as [`Kind::Transport`] and
/// non-successful responses as [`Kind::Status`].
///
/// [`Kind::Transport`]: crate::error::Kind::Transport
/// [`Kind::Status`]: crate::error::Kind::Status
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: SubmissionRequest) -> Result<Response>;
}

/// [`Transport`] backed by `reqwest`, posting JSON to [`SUBMISSION_ENDPOINT`].
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: ReqwestClient,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        Self::with_client(ReqwestClient::new())
    }

    pub fn with_client(client: ReqwestClient) -> Result<Self> {
        Self::with_endpoint(client, SUBMISSION_ENDPOINT)
    }

    /// Posts to `endpoint` instead of the production API, e.g. a sandbox host.
    pub fn with_endpoint(client: ReqwestClient, endpoint: &str) -> Result<Self> {
        Ok(Self {
            client,
            endpoint: Url::parse(endpoint)?,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: SubmissionRequest) -> Result<Response> {
        let http_request = self
            .client
            .request(Method::POST, self.endpoint.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(request.body)
            .build()?;

        #[cfg(feature = "tracing")]
        tracing::debug!(submission_id = %request.id, endpoint = %self.endpoint, "posting document");

        crate::request(&self.client, http_request).await
    }
}
