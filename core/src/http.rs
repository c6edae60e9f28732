//! HTTP request and response values exchanged with a `Transport`.
//!
//! # Design
//! Requests and responses are plain data. The executor builds an
//! `HttpRequest`, hands it to a transport, and validates the `HttpResponse`
//! it gets back without touching the network itself, which keeps validation
//! deterministic and testable against canned responses.
//!
//! The response body is buffered and private. The only ways to get at it in
//! full (`into_body`, `into_text`, the typed decoder) take the response by
//! value, so a body is consumed at most once. `preview` borrows and is only
//! used to build error messages.

use std::fmt;

use crate::constants::PREVIEW_MAX_LENGTH;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `path` is relative to the service root and already URL-encoded, query
/// string included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Attach a serialized JSON body and the matching `Content-Type`.
    pub fn with_json_body(mut self, body: String) -> Self {
        self.headers.push((
            "content-type".to_string(),
            format!("{}; charset=utf-8", crate::constants::JSON_CONTENT_TYPE),
        ));
        self.body = Some(body);
        self
    }
}

/// An HTTP response with its body fully buffered.
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// First value of the named header. Names compare case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// `Content-Type` without parameters, e.g. `application/json` for
    /// `application/json; charset=utf-8`.
    pub fn media_type(&self) -> Option<&str> {
        self.content_type()
            .map(|value| value.split(';').next().unwrap_or_default().trim())
    }

    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// Bounded text excerpt of the body for diagnostics.
    pub fn preview(&self) -> String {
        preview(&self.body)
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Body as text. Invalid UTF-8 sequences are replaced.
    pub fn into_text(self) -> String {
        match String::from_utf8(self.body) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        }
    }
}

/// First `PREVIEW_MAX_LENGTH` characters of `body`, decoded lossily.
///
/// Never fails: undecodable bytes become U+FFFD and an empty body yields an
/// empty string.
pub fn preview(body: &[u8]) -> String {
    String::from_utf8_lossy(body)
        .chars()
        .take(PREVIEW_MAX_LENGTH)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(headers: &[(&str, &str)], body: &str) -> HttpResponse {
        HttpResponse::new(
            200,
            headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body,
        )
    }

    #[test]
    fn header_lookup_ignores_case() {
        let resp = response(&[("Content-Type", "application/json")], "{}");
        assert_eq!(resp.header("content-type"), Some("application/json"));
        assert_eq!(resp.header("CONTENT-TYPE"), Some("application/json"));
        assert_eq!(resp.header("accept"), None);
    }

    #[test]
    fn media_type_strips_parameters() {
        let resp = response(&[("content-type", "text/plain; charset=utf-8")], "");
        assert_eq!(resp.content_type(), Some("text/plain; charset=utf-8"));
        assert_eq!(resp.media_type(), Some("text/plain"));
    }

    #[test]
    fn preview_returns_short_body_unchanged() {
        assert_eq!(preview(b"plain text"), "plain text");
    }

    #[test]
    fn preview_truncates_to_max_length_in_characters() {
        let body = "é".repeat(PREVIEW_MAX_LENGTH + 20);
        let excerpt = preview(body.as_bytes());
        assert_eq!(excerpt.chars().count(), PREVIEW_MAX_LENGTH);
        assert!(excerpt.chars().all(|c| c == 'é'));
    }

    #[test]
    fn preview_of_empty_or_binary_body_does_not_fail() {
        assert_eq!(preview(b""), "");
        assert_eq!(preview(&[0xff, b'o', b'k']), "\u{fffd}ok");
    }

    #[test]
    fn into_text_replaces_invalid_utf8() {
        let resp = HttpResponse::new(200, Vec::new(), vec![b'a', 0xfe, b'b']);
        assert_eq!(resp.into_text(), "a\u{fffd}b");
    }

    #[test]
    fn with_json_body_sets_content_type() {
        let req = HttpRequest::new(HttpMethod::Post, "lists/me/").with_json_body("{}".to_string());
        assert_eq!(
            req.headers,
            vec![(
                "content-type".to_string(),
                "application/json; charset=utf-8".to_string()
            )]
        );
        assert_eq!(req.body.as_deref(), Some("{}"));
    }

    #[test]
    fn method_renders_as_verb() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Post.as_str(), "POST");
    }
}
