//! The network seam between the executor and an HTTP client.
//!
//! # Design
//! `Transport` is the only place that performs I/O. It sends one
//! `HttpRequest` and returns the `HttpResponse` as data, whatever its
//! status. Interpreting the status is the executor's job. `ReqwestTransport`
//! is the production implementation; tests plug in scripted transports.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Method, Url};
use thiserror::Error;

use crate::config::ClientConfig;
use crate::constants::{API_KEY_HEADER, JSON_CONTENT_TYPE};
use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// The request did not produce a response.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Executes a single HTTP round trip.
///
/// Implementations must not retry and must return non-2xx responses as
/// `Ok`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `Transport` backed by a shared `reqwest::Client`.
///
/// Default headers, including the API key, are fixed when the transport is
/// built.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(config.base_url()).map_err(|e| {
            ClientError::invalid_argument("base_url", format!("invalid base URL: {e}"))
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(config.user_agent()).map_err(|e| {
                ClientError::invalid_argument("user_agent", format!("invalid user agent: {e}"))
            })?,
        );
        let mut api_key = HeaderValue::from_str(config.api_key()).map_err(|e| {
            ClientError::invalid_argument("api_key", format!("invalid API key: {e}"))
        })?;
        api_key.set_sensitive(true);
        headers.insert(HeaderName::from_static(API_KEY_HEADER), api_key);

        let mut builder = Client::builder()
            .default_headers(headers)
            .gzip(true)
            .brotli(true)
            .deflate(true);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            ClientError::invalid_argument("config", format!("failed to build HTTP client: {e}"))
        })?;

        tracing::debug!(base_url = %base_url, "http transport ready");
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
    }
}

/// Header values that are not visible ASCII are kept, decoded lossily, so
/// a malformed `Content-Type` still reaches validation.
fn collect_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = self
            .base_url
            .join(&request.path)
            .map_err(|e| TransportError::new(format!("invalid request path {:?}: {e}", request.path)))?;

        let mut builder = self.client.request(to_reqwest_method(request.method), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| TransportError::new(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::new(format!("failed to read response body: {e}")))?;

        Ok(HttpResponse::new(status, headers, body.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn methods_map_to_reqwest() {
        assert_eq!(to_reqwest_method(HttpMethod::Get), Method::GET);
        assert_eq!(to_reqwest_method(HttpMethod::Post), Method::POST);
    }

    #[test]
    fn non_ascii_header_values_are_kept() {
        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_bytes(b"text/html; charset=\xe9").unwrap(),
        );
        let collected = collect_headers(&headers);
        assert_eq!(
            collected,
            vec![(
                "content-type".to_string(),
                "text/html; charset=\u{fffd}".to_string()
            )]
        );

        let response = HttpResponse::new(200, collected, "<html>");
        assert_eq!(response.media_type(), Some("text/html"));
    }

    #[test]
    fn relative_paths_keep_version_segment() {
        let transport = ReqwestTransport::new(&ClientConfig::new("key")).unwrap();
        let url = transport.base_url().join("lists/me/my-list/").unwrap();
        assert_eq!(url.as_str(), "https://api.ioclists.com/v1/lists/me/my-list/");
        let url = transport
            .base_url()
            .join("indicator/entries?indicator=1.2.3.4")
            .unwrap();
        assert_eq!(url.query(), Some("indicator=1.2.3.4"));
    }

    #[test]
    fn rejects_api_key_with_control_characters() {
        let err = ReqwestTransport::new(&ClientConfig::new("bad\nkey")).unwrap_err();
        assert!(matches!(
            err.kind(),
            crate::error::ErrorKind::InvalidArgument { argument: "api_key" }
        ));
    }
}
