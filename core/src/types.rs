//! Domain DTOs for the IOC Lists API.
//!
//! # Design
//! Wire names are declared per field with `#[serde(rename)]`, so the mapping
//! between service JSON and Rust field names is fixed at compile time.
//! Timestamps go through `codec::epoch_millis` and `FeedType` through the
//! upper-case enum codec.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{EnumIter, IntoStaticStr};

use crate::codec::{self, epoch_millis};
use crate::constants::{DEFAULT_HOURS_TO_EXPIRE, DESCRIPTION_MAX_LENGTH};
use crate::error::ClientError;

/// Classification of the indicators a list holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum FeedType {
    /// IPs, domains, URLs and hashes with malicious intent.
    #[default]
    Security,
    /// Indicators aligned with a theme, such as allow lists or advertising
    /// domains.
    Content,
}

impl Serialize for FeedType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&codec::encode_variant(*self))
    }
}

impl<'de> Deserialize<'de> for FeedType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = String::deserialize(deserializer)?;
        codec::decode_variant(&wire).map_err(serde::de::Error::custom)
    }
}

/// A single indicator record in a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub username: String,
    #[serde(rename = "feedname")]
    pub list_name: String,
    /// Raw entry text, indicator plus optional comment.
    pub raw: String,
    #[serde(rename = "timestamp", with = "epoch_millis")]
    pub added_at: DateTime<Utc>,
    #[serde(rename = "entry_id")]
    pub id: String,
}

/// Request payload for creating a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateListParameters {
    #[serde(rename = "user")]
    pub username: String,
    #[serde(rename = "listname")]
    pub list_name: String,
    /// Short descriptor, at most 250 characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Hours the indicators stay active. Informational on the service side.
    #[serde(rename = "expiration", default = "default_hours_to_expire")]
    pub hours_to_expire: u32,
    #[serde(default)]
    pub feed_type: FeedType,
    /// Private lists are hidden from search and metrics.
    #[serde(rename = "private", default)]
    pub is_private: bool,
    #[serde(rename = "active", default = "default_true")]
    pub is_active: bool,
    /// Declares the list a mirror of an existing source.
    #[serde(rename = "mirror", default)]
    pub is_mirror: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror_original_url: Option<String>,
}

fn default_hours_to_expire() -> u32 {
    DEFAULT_HOURS_TO_EXPIRE
}

fn default_true() -> bool {
    true
}

impl CreateListParameters {
    pub fn new(username: impl Into<String>, list_name: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            list_name: list_name.into(),
            description: None,
            hours_to_expire: DEFAULT_HOURS_TO_EXPIRE,
            feed_type: FeedType::default(),
            is_private: false,
            is_active: true,
            is_mirror: false,
            mirror_original_url: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_feed_type(mut self, feed_type: FeedType) -> Self {
        self.feed_type = feed_type;
        self
    }

    pub fn with_hours_to_expire(mut self, hours: u32) -> Self {
        self.hours_to_expire = hours;
        self
    }

    pub fn private(mut self, is_private: bool) -> Self {
        self.is_private = is_private;
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn mirror_of(mut self, original_url: Option<String>) -> Self {
        self.is_mirror = true;
        self.mirror_original_url = original_url;
        self
    }

    /// Reject parameters the service would refuse, before any request.
    pub fn validate(&self) -> Result<(), ClientError> {
        require_non_empty("username", &self.username)?;
        require_non_empty("list_name", &self.list_name)?;
        if self.hours_to_expire < 1 {
            return Err(ClientError::invalid_argument(
                "hours_to_expire",
                "hours to expire must be a positive number",
            ));
        }
        if let Some(description) = &self.description {
            let length = description.chars().count();
            if length > DESCRIPTION_MAX_LENGTH {
                return Err(ClientError::invalid_argument(
                    "description",
                    format!(
                        "description is {length} characters long, the limit is {DESCRIPTION_MAX_LENGTH}"
                    ),
                ));
            }
        }
        Ok(())
    }
}

pub(crate) fn require_non_empty(argument: &'static str, value: &str) -> Result<(), ClientError> {
    if value.trim().is_empty() {
        return Err(ClientError::invalid_argument(
            argument,
            format!("{argument} is empty"),
        ));
    }
    Ok(())
}

/// Request payload for adding an entry to a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryAddParameters {
    pub entry: String,
}

/// Response body of the recent-entries endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntriesContainer {
    pub entries: Vec<Entry>,
}

/// Response body of the indicator search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchContainer {
    #[serde(default)]
    pub search_results: Vec<Entry>,
}

/// Structured error body the service returns with status 400.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceError {
    #[serde(rename = "result")]
    pub status: String,
    pub message: String,
}
