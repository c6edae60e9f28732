//! Error type for the IOC Lists client.
//!
//! # Design
//! Every failure is a `ClientError`. Callers tell failures apart by matching
//! on `ErrorKind`, not by type. Failures that come from a request carry a
//! `RequestContext` (method, path, and status once a response exists);
//! argument validation failures happen before any I/O and carry none.

use thiserror::Error;

use crate::http::HttpMethod;

/// What went wrong. Kind-specific details live in the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The service returned 401; the API key was rejected.
    Unauthorized,

    /// The service returned 429.
    RateLimited,

    /// The service returned 400 with a structured error body.
    BadRequest { status: String, message: String },

    /// The response is missing a `Content-Type` header or carries the wrong
    /// one. `preview` is empty when the header is missing.
    ProtocolViolation { preview: String },

    /// Any status other than 200, 400, 401 and 429.
    UnexpectedStatus { status: u16, preview: String },

    /// A body was expected but the response had none.
    EmptyBody,

    /// The body could not be parsed into the target type.
    DecodeFailure { cause: String, preview: String },

    /// The caller passed an invalid argument. Raised before any request.
    InvalidArgument { argument: &'static str },

    /// The transport failed before a response was received.
    Transport,

    /// The request payload could not be serialized.
    Encode,
}

/// Request that triggered a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub method: HttpMethod,
    pub path: String,
    /// `None` when no response was received.
    pub status: Option<u16>,
}

/// Error returned by every fallible client operation.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ClientError {
    kind: ErrorKind,
    message: String,
    context: Option<RequestContext>,
}

impl ClientError {
    /// Failure tied to a request.
    pub fn request(
        kind: ErrorKind,
        message: impl Into<String>,
        method: HttpMethod,
        path: impl Into<String>,
        status: Option<u16>,
    ) -> Self {
        Self::build(
            kind,
            message.into(),
            Some(RequestContext {
                method,
                path: path.into(),
                status,
            }),
        )
    }

    pub fn invalid_argument(argument: &'static str, message: impl Into<String>) -> Self {
        Self::build(ErrorKind::InvalidArgument { argument }, message.into(), None)
    }

    fn build(kind: ErrorKind, message: String, context: Option<RequestContext>) -> Self {
        let message = if message.trim().is_empty() {
            format!("{kind:?}")
        } else {
            message
        };
        Self {
            kind,
            message,
            context,
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> Option<&RequestContext> {
        self.context.as_ref()
    }

    pub fn method(&self) -> Option<HttpMethod> {
        self.context.as_ref().map(|ctx| ctx.method)
    }

    pub fn path(&self) -> Option<&str> {
        self.context.as_ref().map(|ctx| ctx.path.as_str())
    }

    pub fn status_code(&self) -> Option<u16> {
        self.context.as_ref().and_then(|ctx| ctx.status)
    }
}
