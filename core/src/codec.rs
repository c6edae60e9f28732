//! Wire conventions of the IOC Lists API.
//!
//! Timestamps travel as fractional milliseconds since the Unix epoch and
//! enum variants travel as their upper-cased names. Both codecs fail instead
//! of substituting a default.

use chrono::{DateTime, TimeDelta, Utc};
use strum::IntoEnumIterator;
use thiserror::Error;

const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// Milliseconds since the Unix epoch, keeping any sub-millisecond fraction.
pub fn encode_timestamp(value: &DateTime<Utc>) -> f64 {
    let whole = value.timestamp_millis() as f64;
    let sub_milli_nanos = value.timestamp_subsec_nanos() % 1_000_000;
    whole + f64::from(sub_milli_nanos) / NANOS_PER_MILLI
}

/// The epoch plus `millis` milliseconds, rounded to the nanosecond.
///
/// `None` for non-finite input or a result outside chrono's range.
pub fn decode_timestamp(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    let mut whole = millis.floor();
    let mut nanos = ((millis - whole) * NANOS_PER_MILLI).round() as i64;
    if nanos >= 1_000_000 {
        whole += 1.0;
        nanos -= 1_000_000;
    }
    if whole < i64::MIN as f64 || whole >= i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(whole as i64)?.checked_add_signed(TimeDelta::nanoseconds(nanos))
}

/// `#[serde(with = "epoch_millis")]` adapter for `DateTime<Utc>` fields.
pub mod epoch_millis {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(super::encode_timestamp(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let millis = f64::deserialize(deserializer)?;
        super::decode_timestamp(millis).ok_or_else(|| {
            de::Error::custom(format!("timestamp {millis} ms is outside the representable range"))
        })
    }
}

/// A wire string that matches no variant of the target enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown variant `{found}`, expected one of {expected:?}")]
pub struct UnknownVariant {
    pub found: String,
    pub expected: Vec<String>,
}

/// Upper-cased native name of `value`.
pub fn encode_variant<E>(value: E) -> String
where
    E: Into<&'static str>,
{
    value.into().to_uppercase()
}

/// Variant whose upper-cased name equals `wire` exactly.
pub fn decode_variant<E>(wire: &str) -> Result<E, UnknownVariant>
where
    E: IntoEnumIterator + Into<&'static str> + Copy,
{
    E::iter()
        .find(|variant| encode_variant(*variant) == wire)
        .ok_or_else(|| UnknownVariant {
            found: wire.to_string(),
            expected: E::iter().map(encode_variant).collect(),
        })
}
