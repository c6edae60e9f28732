//! Request execution, response validation and typed decoding.
//!
//! # Design
//! `validate_response` and `decode` are pure functions over `HttpResponse`,
//! so every status and content-type rule is testable without a network.
//! `RequestExecutor` wraps them around a single `Transport::send` call.
//!
//! Validation order matters: 401 and 429 win over everything, then the
//! `Content-Type` must match before the status is looked at further. A 400
//! with the right content type is decoded as a `ServiceError`.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::constants::JSON_CONTENT_TYPE;
use crate::error::{ClientError, ErrorKind};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::ServiceError;

/// Sends requests through a transport and validates what comes back.
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor").finish_non_exhaustive()
    }
}

impl RequestExecutor {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Serialize `body` (if any), send the request, and validate the response
    /// against `expected_content_type`.
    ///
    /// On success the response is returned with its body unread.
    pub async fn execute<B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        expected_content_type: &str,
    ) -> Result<HttpResponse, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let request = build_request(method, path, body)?;
        self.send(request, expected_content_type).await
    }

    /// `execute` expecting `application/json`.
    pub async fn execute_json<B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
    ) -> Result<HttpResponse, ClientError>
    where
        B: Serialize + ?Sized,
    {
        self.execute(method, path, body, JSON_CONTENT_TYPE).await
    }

    /// Send a prepared request and validate the response.
    pub async fn send(
        &self,
        request: HttpRequest,
        expected_content_type: &str,
    ) -> Result<HttpResponse, ClientError> {
        let method = request.method;
        let path = request.path.clone();
        debug!(%method, %path, "sending request");

        let response = self.transport.send(request).await.map_err(|e| {
            warn!(%method, %path, error = %e, "transport failed");
            ClientError::request(
                ErrorKind::Transport,
                format!("failed to send {method} {path}: {e}"),
                method,
                &path,
                None,
            )
        })?;

        match validate_response(response, method, &path, expected_content_type) {
            Ok(response) => {
                debug!(%method, %path, status = response.status, bytes = response.body_len(), "response accepted");
                Ok(response)
            }
            Err(err) => {
                warn!(%method, %path, status = ?err.status_code(), kind = ?err.kind(), "response rejected");
                Err(err)
            }
        }
    }
}

/// Request descriptor for `method` and `path`, with `body` serialized as
/// JSON when present.
pub fn build_request<B>(method: HttpMethod, path: &str, body: Option<&B>) -> Result<HttpRequest, ClientError>
where
    B: Serialize + ?Sized,
{
    let request = HttpRequest::new(method, path);
    let Some(body) = body else {
        return Ok(request);
    };
    let json = serde_json::to_string(body).map_err(|e| {
        ClientError::request(
            ErrorKind::Encode,
            format!("failed to serialize request body for {method} {path}: {e}"),
            method,
            path,
            None,
        )
    })?;
    Ok(request.with_json_body(json))
}

/// Apply the status and content-type rules to a response.
///
/// Returns the response unconsumed when the status is 200 and the media type
/// equals `expected_content_type` (ASCII case-insensitive, parameters
/// ignored).
pub fn validate_response(
    response: HttpResponse,
    method: HttpMethod,
    path: &str,
    expected_content_type: &str,
) -> Result<HttpResponse, ClientError> {
    let status = response.status;
    let fail = |kind: ErrorKind, message: String| {
        ClientError::request(kind, message, method, path, Some(status))
    };

    match status {
        401 => {
            return Err(fail(
                ErrorKind::Unauthorized,
                "the API key was rejected, check that it is valid".to_string(),
            ))
        }
        429 => {
            return Err(fail(
                ErrorKind::RateLimited,
                "too many requests sent to the API".to_string(),
            ))
        }
        _ => {}
    }

    let Some(media_type) = response.media_type() else {
        return Err(fail(
            ErrorKind::ProtocolViolation {
                preview: String::new(),
            },
            format!("{method} {path}: response is missing a Content-Type header"),
        ));
    };
    if !media_type.eq_ignore_ascii_case(expected_content_type) {
        let preview = response.preview();
        let message = format!(
            "{method} {path}: expected Content-Type {expected_content_type}, received {}\nPreview: {preview}",
            response.content_type().unwrap_or_default()
        );
        return Err(fail(ErrorKind::ProtocolViolation { preview }, message));
    }

    match status {
        200 => Ok(response),
        400 => {
            let payload: ServiceError = decode(response, method, path)?;
            let message = format!(
                "failed to request {method} {path}, received status {} and message {:?}",
                payload.status, payload.message
            );
            Err(fail(
                ErrorKind::BadRequest {
                    status: payload.status,
                    message: payload.message,
                },
                message,
            ))
        }
        _ => {
            let preview = response.preview();
            let message = format!(
                "failed to request {method} {path}, received status code {status}\nPreview: {preview}"
            );
            Err(fail(ErrorKind::UnexpectedStatus { status, preview }, message))
        }
    }
}

/// Parse a response body as JSON into `T`.
///
/// An empty body is `EmptyBody`. Any parse failure, including a field codec
/// rejecting its value, is `DecodeFailure` with the serde error and a body
/// preview folded into the message.
pub fn decode<T: DeserializeOwned>(
    response: HttpResponse,
    method: HttpMethod,
    path: &str,
) -> Result<T, ClientError> {
    let status = Some(response.status);
    let body = response.into_body();
    if body.is_empty() {
        return Err(ClientError::request(
            ErrorKind::EmptyBody,
            format!("{method} {path}: response body is empty, cannot parse it as JSON"),
            method,
            path,
            status,
        ));
    }

    serde_json::from_slice(&body).map_err(|e| {
        let preview = crate::http::preview(&body);
        let cause = format!("{:?} => {e}", e.classify());
        ClientError::request(
            ErrorKind::DecodeFailure {
                cause: cause.clone(),
                preview: preview.clone(),
            },
            format!("{method} {path}: failed to parse JSON: {cause}\nPreview: {preview}"),
            method,
            path,
            status,
        )
    })
}
