//! Asynchronous client for the IOC Lists indicator-list API.
//!
//! # Overview
//! Builds requests for the list and entry operations, sends them through a
//! pluggable `Transport`, validates every response against a fixed policy,
//! and decodes JSON bodies into typed values.
//!
//! # Design
//! - `IocListsClient` builds `HttpRequest` values in pure `build_*` methods,
//!   so argument validation happens before any I/O.
//! - `executor::validate_response` maps status codes and content types onto
//!   one `ClientError` type whose `ErrorKind` callers match on.
//! - Responses are buffered `HttpResponse` values whose body can only be
//!   taken by value, so it is read at most once.
//! - Timestamps use the service's epoch-millisecond format and enums their
//!   upper-case names (`codec`).

pub mod client;
pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod executor;
pub mod http;
pub mod transport;
pub mod types;

pub use client::IocListsClient;
pub use config::ClientConfig;
pub use error::{ClientError, ErrorKind, RequestContext};
pub use executor::{decode, validate_response, RequestExecutor};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{ReqwestTransport, Transport, TransportError};
pub use types::{
    CreateListParameters, EntriesContainer, Entry, EntryAddParameters, FeedType, SearchContainer,
    ServiceError,
};
