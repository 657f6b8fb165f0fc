use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;

use reqwest::{Method, StatusCode};
use strum_macros::Display;

/// Boxed error returned by pluggable collaborators such as signers.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Kind {
    /// The endpoint answered with a non-successful HTTP status
    Status,
    /// The request never produced a response (connect, I/O, body read)
    Transport,
    /// Wire JSON did not match the document schema
    MalformedWireFormat,
    /// The signing step rejected the payload
    Signing,
    /// The client was shut down before the submission was accepted
    ClientClosed,
    /// The submission was abandoned before it completed
    Cancelled,
    /// Invalid caller-provided configuration
    Validation,
    /// Runtime or encoding failure inside the client
    Internal,
}

#[derive(Debug)]
pub struct Error {
    kind: Kind,
    source: Option<BoxError>,
    backtrace: Backtrace,
}

impl Error {
    pub fn with_source<S: StdError + Send + Sync + 'static>(kind: Kind, source: S) -> Self {
        Self::with_boxed_source(kind, Box::new(source))
    }

    pub fn with_boxed_source(kind: Kind, source: BoxError) -> Self {
        Self {
            kind,
            source: Some(source),
            backtrace: Backtrace::capture(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[must_use]
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    #[must_use]
    pub fn inner(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        let source = self.source.as_deref()?;
        source.downcast_ref::<E>()
    }

    /// Network-level and HTTP-level failures both count as transport failures.
    #[must_use]
    pub fn is_transport_failure(&self) -> bool {
        matches!(self.kind, Kind::Transport | Kind::Status)
    }

    pub fn validation<S: Into<String>>(reason: S) -> Self {
        Validation {
            reason: reason.into(),
        }
        .into()
    }

    pub fn status<S: Into<String>>(
        status_code: StatusCode,
        method: Method,
        path: String,
        message: S,
    ) -> Self {
        Status {
            status_code,
            method,
            path,
            message: message.into(),
        }
        .into()
    }

    pub fn signing(source: BoxError) -> Self {
        Self::with_boxed_source(Kind::Signing, source)
    }

    pub fn malformed<S: StdError + Send + Sync + 'static>(source: S) -> Self {
        Self::with_source(Kind::MalformedWireFormat, source)
    }

    pub fn closed() -> Self {
        Closed.into()
    }

    pub fn cancelled(reason: CancelReason) -> Self {
        Cancelled { reason }.into()
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::with_source(
            Kind::Internal,
            Internal {
                message: message.into(),
            },
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {source}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn StdError + 'static))
    }
}

/// Non-successful HTTP response from the submission endpoint.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Status {
    pub status_code: StatusCode,
    pub method: Method,
    pub path: String,
    pub message: String,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} returned {}: {}",
            self.method, self.path, self.status_code, self.message
        )
    }
}

impl StdError for Status {}

impl From<Status> for Error {
    fn from(err: Status) -> Self {
        Error::with_source(Kind::Status, err)
    }
}

#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Validation {
    pub reason: String,
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid: {}", self.reason)
    }
}

impl StdError for Validation {}

impl From<Validation> for Error {
    fn from(err: Validation) -> Self {
        Error::with_source(Kind::Validation, err)
    }
}

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Closed;

impl fmt::Display for Closed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("client has been shut down")
    }
}

impl StdError for Closed {}

impl From<Closed> for Error {
    fn from(err: Closed) -> Self {
        Error::with_source(Kind::ClientClosed, err)
    }
}

/// Why a submission stopped before reaching a result.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum CancelReason {
    /// The handle was cancelled or dropped by its owner
    #[strum(serialize = "cancelled by caller")]
    Caller,
    /// The acquire deadline passed before a permit was issued
    #[strum(serialize = "acquire deadline elapsed")]
    Deadline,
    /// The client was shut down with the cancel policy
    #[strum(serialize = "client shut down")]
    Shutdown,
}

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Cancelled {
    pub reason: CancelReason,
}

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "submission cancelled: {}", self.reason)
    }
}

impl StdError for Cancelled {}

impl From<Cancelled> for Error {
    fn from(err: Cancelled) -> Self {
        Error::with_source(Kind::Cancelled, err)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct Internal {
    message: String,
}

impl fmt::Display for Internal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for Internal {}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::with_source(Kind::Transport, err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(Kind::Validation, err)
    }
}
