//! Pluggable signing step applied to every encoded document before it is sent.

use std::result::Result as StdResult;

use async_trait::async_trait;

use crate::error::BoxError;

/// Turns encoded document bytes into the payload that is posted to the endpoint.
///
/// The client treats signing as opaque; any error it returns fails the submission
/// with [`Kind::Signing`](crate::error::Kind::Signing).
#[async_trait]
pub trait Sign: Send + Sync {
    async fn sign(&self, document: &[u8]) -> StdResult<Vec<u8>, BoxError>;
}

/// Sends the encoded document unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassThrough;

#[async_trait]
impl Sign for PassThrough {
    async fn sign(&self, document: &[u8]) -> StdResult<Vec<u8>, BoxError> {
        Ok(document.to_vec())
    }
}

#[async_trait]
impl<F> Sign for F
where
    F: Fn(&[u8]) -> StdResult<Vec<u8>, BoxError> + Send + Sync,
{
    async fn sign(&self, document: &[u8]) -> StdResult<Vec<u8>, BoxError> {
        self(document)
    }
}
