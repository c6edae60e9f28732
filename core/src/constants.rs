//! Fixed protocol values for the IOC Lists v1 API.

/// Versioned service root. Relative request paths are joined onto this.
pub const DEFAULT_BASE_URL: &str = "https://api.ioclists.com/v1/";

pub const DEFAULT_USER_AGENT: &str = concat!("ioclists-rs/", env!("CARGO_PKG_VERSION"));

/// Header carrying the API key, attached once when the transport is built.
/// Lower case, as `http` header names are stored.
pub const API_KEY_HEADER: &str = "x-api-key";

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const PLAIN_TEXT_CONTENT_TYPE: &str = "text/plain";

/// Maximum number of characters of a response body embedded in an error
/// message.
pub const PREVIEW_MAX_LENGTH: usize = 500;

/// Longest list description the service accepts, in characters.
pub const DESCRIPTION_MAX_LENGTH: usize = 250;

/// One year (365.25 days) in hours.
pub const DEFAULT_HOURS_TO_EXPIRE: u32 = 8766;
