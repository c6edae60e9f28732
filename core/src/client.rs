//! IOC Lists API client.
//!
//! # Design
//! Every operation is split in two. A `build_*` method validates the
//! arguments and produces an `HttpRequest` without touching the network; the
//! async method of the same name sends it through the `RequestExecutor` and
//! decodes the result. Invalid arguments therefore fail before any I/O.

use std::sync::Arc;

use url::form_urlencoded;

use crate::config::ClientConfig;
use crate::constants::{JSON_CONTENT_TYPE, PLAIN_TEXT_CONTENT_TYPE};
use crate::error::ClientError;
use crate::executor::{build_request, decode, RequestExecutor};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{
    require_non_empty, CreateListParameters, EntriesContainer, Entry, EntryAddParameters,
    SearchContainer,
};

/// Asynchronous client for the IOC Lists API.
///
/// Holds no per-request state; clones share the underlying transport and
/// may be used concurrently.
#[derive(Debug, Clone)]
pub struct IocListsClient {
    executor: RequestExecutor,
}

impl IocListsClient {
    /// Client over HTTPS with the API key and headers from `config`.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            executor: RequestExecutor::new(transport),
        }
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    // -----------------------------------------------------------------------
    // Request builders
    // -----------------------------------------------------------------------

    pub fn build_create_list(
        &self,
        parameters: &CreateListParameters,
    ) -> Result<HttpRequest, ClientError> {
        parameters.validate()?;
        require_path_segment("username", &parameters.username)?;
        let path = format!("lists/{}/", encode_segment(&parameters.username));
        build_request(HttpMethod::Post, &path, Some(parameters))
    }

    pub fn build_add(
        &self,
        username: &str,
        list_name: &str,
        entry: &str,
    ) -> Result<HttpRequest, ClientError> {
        require_non_empty("entry", entry)?;
        let path = list_path(username, list_name)?;
        let body = EntryAddParameters {
            entry: entry.to_string(),
        };
        build_request(HttpMethod::Post, &path, Some(&body))
    }

    pub fn build_get_recent(&self, username: &str, list_name: &str) -> Result<HttpRequest, ClientError> {
        Ok(HttpRequest::new(HttpMethod::Get, list_path(username, list_name)?))
    }

    pub fn build_get_unique(&self, username: &str, list_name: &str) -> Result<HttpRequest, ClientError> {
        let path = format!("{}indicators/unique", list_path(username, list_name)?);
        Ok(HttpRequest::new(HttpMethod::Get, path))
    }

    pub fn build_search(&self, query: &str) -> Result<HttpRequest, ClientError> {
        require_non_empty("query", query)?;
        let path = format!("indicator/entries?indicator={}", encode_query(query));
        Ok(HttpRequest::new(HttpMethod::Get, path))
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Create a new list owned by `parameters.username`.
    pub async fn create_list(&self, parameters: &CreateListParameters) -> Result<(), ClientError> {
        let request = self.build_create_list(parameters)?;
        self.executor.send(request, JSON_CONTENT_TYPE).await?;
        Ok(())
    }

    /// Add an entry to a list.
    ///
    /// `entry` is the raw entry text, e.g.
    /// `hxxps://example[.]com -- Example Indicator`.
    pub async fn add(&self, username: &str, list_name: &str, entry: &str) -> Result<(), ClientError> {
        let request = self.build_add(username, list_name, entry)?;
        self.executor.send(request, JSON_CONTENT_TYPE).await?;
        Ok(())
    }

    /// The 20 most recent entries of a list.
    pub async fn get_recent(&self, username: &str, list_name: &str) -> Result<Vec<Entry>, ClientError> {
        let request = self.build_get_recent(username, list_name)?;
        let (method, path) = (request.method, request.path.clone());
        let response = self.executor.send(request, JSON_CONTENT_TYPE).await?;
        let container: EntriesContainer = decode(response, method, &path)?;
        Ok(container.entries)
    }

    /// Every unique indicator in a list.
    pub async fn get_unique(&self, username: &str, list_name: &str) -> Result<Vec<String>, ClientError> {
        let request = self.build_get_unique(username, list_name)?;
        let response = self.executor.send(request, PLAIN_TEXT_CONTENT_TYPE).await?;
        Ok(parse_unique(response))
    }

    /// Entries containing `query` across all public lists.
    ///
    /// Accepted queries: IPv4, IPv6, FQDN, URL, MD5, SHA1 and SHA256.
    pub async fn search(&self, query: &str) -> Result<Vec<Entry>, ClientError> {
        let request = self.build_search(query)?;
        let (method, path) = (request.method, request.path.clone());
        let response = self.executor.send(request, JSON_CONTENT_TYPE).await?;
        let container: SearchContainer = decode(response, method, &path)?;
        Ok(container.search_results)
    }
}

fn list_path(username: &str, list_name: &str) -> Result<String, ClientError> {
    require_non_empty("username", username)?;
    require_non_empty("list_name", list_name)?;
    require_path_segment("username", username)?;
    require_path_segment("list_name", list_name)?;
    Ok(format!(
        "lists/{}/{}/",
        encode_segment(username),
        encode_segment(list_name)
    ))
}

/// Rejects `.` and `..`, which URL resolution collapses into a different
/// endpoint whether or not they are percent-encoded.
fn require_path_segment(argument: &'static str, value: &str) -> Result<(), ClientError> {
    if value == "." || value == ".." {
        return Err(ClientError::invalid_argument(
            argument,
            format!("{argument} cannot be {value:?}"),
        ));
    }
    Ok(())
}

/// Percent-encode a single path segment. Spaces become `%20`.
fn encode_segment(segment: &str) -> String {
    form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn encode_query(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Lines of a `text/plain` body up to the first empty line.
fn parse_unique(response: HttpResponse) -> Vec<String> {
    response
        .into_text()
        .lines()
        .take_while(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::FeedType;

    fn client() -> IocListsClient {
        IocListsClient::new(ClientConfig::new("key")).unwrap()
    }

    fn text(body: &str) -> HttpResponse {
        HttpResponse::new(
            200,
            vec![("content-type".to_string(), "text/plain".to_string())],
            body,
        )
    }

    #[test]
    fn new_rejects_empty_api_key() {
        let err = IocListsClient::new(ClientConfig::new("")).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { argument: "api_key" }));
    }

    #[test]
    fn build_create_list_produces_correct_request() {
        let params = CreateListParameters::new("me", "my list")
            .with_description("Testing")
            .with_feed_type(FeedType::Content);
        let req = client().build_create_list(&params).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "lists/me/");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["listname"], "my list");
        assert_eq!(body["feed_type"], "CONTENT");
        assert_eq!(body["expiration"], 8766);
    }

    #[test]
    fn build_create_list_rejects_long_description() {
        let params = CreateListParameters::new("me", "l").with_description("d".repeat(251));
        let err = client().build_create_list(&params).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { argument: "description" }));
        assert!(err.context().is_none());
    }

    #[test]
    fn build_add_encodes_list_name_and_wraps_entry() {
        let req = client()
            .build_add("me", "my list/2", "https://example[.]com -- Testing")
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "lists/me/my%20list%2F2/");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"entry": "https://example[.]com -- Testing"}));
    }

    #[test]
    fn build_add_rejects_empty_entry() {
        let err = client().build_add("me", "l", "").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { argument: "entry" }));
    }

    #[test]
    fn build_get_recent_produces_correct_request() {
        let req = client().build_get_recent("mirrors", "phishtank").unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "lists/mirrors/phishtank/");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_get_unique_produces_correct_request() {
        let req = client().build_get_unique("mirrors", "phishtank").unwrap();
        assert_eq!(req.path, "lists/mirrors/phishtank/indicators/unique");
    }

    #[test]
    fn build_search_encodes_query() {
        let req = client().build_search("http://a.com/?x=1&y=2").unwrap();
        assert_eq!(
            req.path,
            "indicator/entries?indicator=http%3A%2F%2Fa.com%2F%3Fx%3D1%26y%3D2"
        );
        let err = client().build_search(" ").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { argument: "query" }));
    }

    #[test]
    fn missing_list_arguments_are_rejected() {
        let err = client().build_get_recent("", "l").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { argument: "username" }));
        let err = client().build_get_unique("u", "").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { argument: "list_name" }));
    }

    #[test]
    fn dot_segments_are_rejected_before_any_request() {
        let client = client();
        for dots in [".", ".."] {
            let err = client.build_get_recent("me", dots).unwrap_err();
            assert!(matches!(err.kind(), ErrorKind::InvalidArgument { argument: "list_name" }));
            let err = client.build_get_unique(dots, "l").unwrap_err();
            assert!(matches!(err.kind(), ErrorKind::InvalidArgument { argument: "username" }));
            let err = client.build_add("me", dots, "1.2.3.4").unwrap_err();
            assert!(matches!(err.kind(), ErrorKind::InvalidArgument { argument: "list_name" }));
            let err = client
                .build_create_list(&CreateListParameters::new(dots, "l"))
                .unwrap_err();
            assert!(matches!(err.kind(), ErrorKind::InvalidArgument { argument: "username" }));
            assert!(err.context().is_none());
        }
        // Dots inside a name are ordinary characters.
        let req = client.build_get_recent("me", "...").unwrap();
        assert_eq!(req.path, "lists/me/.../");
    }

    #[test]
    fn parse_unique_stops_at_empty_line() {
        assert_eq!(
            parse_unique(text("1.2.3.4\r\nexample[.]com\n\nignored\n")),
            vec!["1.2.3.4".to_string(), "example[.]com".to_string()]
        );
    }

    #[test]
    fn parse_unique_handles_empty_and_unterminated_bodies() {
        assert!(parse_unique(text("")).is_empty());
        assert_eq!(parse_unique(text("a\nb")), vec!["a".to_string(), "b".to_string()]);
    }
}
